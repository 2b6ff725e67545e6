//! Signal quality interpretation.
//!
//! Quality, level and noise travel as single bytes. Relative values are
//! unsigned in `[0, max]`. Absolute values are dBm in `[-192, 63]`, so raw
//! bytes of 64 and above wrap to negative powers. Since Wireless Extensions
//! 19 an explicit flag marks dBm; older drivers are recognised by a level
//! above the interface's relative maximum. RCPI (IEEE 802.11k) is a third,
//! separately flagged encoding.

use crate::api::models::{
    CapabilityRange, QualityFlags, QualitySample, RelativeValue, SignalReading,
};
use crate::types::constants::rcpi;

/// Converts a raw quality sample into a [`SignalReading`].
///
/// Pure: the result depends only on the arguments. Without a range nothing
/// can be decided and the reading is [`SignalReading::Unavailable`].
///
/// # Example
///
/// ```
/// use iwscan::{CapabilityRange, QualityFlags, QualitySample, SignalReading, interpret};
///
/// let mut range = CapabilityRange::default();
/// range.max_qual.level = 60;
/// let sample = QualitySample {
///     quality: 20,
///     level: 200,
///     noise: 0,
///     updated: QualityFlags::DBM | QualityFlags::NOISE_INVALID,
/// };
/// match interpret(sample, Some(&range)) {
///     SignalReading::AbsoluteDbm { signal, noise, .. } => {
///         assert_eq!(signal, Some(-56));
///         assert_eq!(noise, None);
///     }
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
pub fn interpret(raw: QualitySample, range: Option<&CapabilityRange>) -> SignalReading {
    let Some(range) = range else {
        return SignalReading::Unavailable;
    };

    let flags = raw.updated;
    // A zero level only carries information when the encoding is explicit.
    if raw.level == 0 && !flags.intersects(QualityFlags::DBM | QualityFlags::RCPI) {
        return SignalReading::Unavailable;
    }

    let max = range.max_qual;
    let quality = valid(flags, QualityFlags::QUAL_INVALID).then_some(RelativeValue {
        value: raw.quality,
        max: max.quality,
    });
    let level_valid = valid(flags, QualityFlags::LEVEL_INVALID);
    let noise_valid = valid(flags, QualityFlags::NOISE_INVALID);

    if flags.contains(QualityFlags::RCPI) {
        return SignalReading::Rcpi {
            quality,
            signal_dbm: level_valid.then(|| rcpi_to_dbm(raw.level)),
            noise_dbm: noise_valid.then(|| rcpi_to_dbm(raw.noise)),
        };
    }

    if flags.contains(QualityFlags::DBM) || raw.level > max.level {
        return SignalReading::AbsoluteDbm {
            quality,
            signal: level_valid.then(|| wrap_dbm(raw.level)),
            noise: noise_valid.then(|| wrap_dbm(raw.noise)),
        };
    }

    SignalReading::Percentage {
        quality,
        level: level_valid.then_some(RelativeValue {
            value: raw.level,
            max: max.level,
        }),
        noise: noise_valid.then_some(RelativeValue {
            value: raw.noise,
            max: max.noise,
        }),
    }
}

fn valid(flags: QualityFlags, invalid: QualityFlags) -> bool {
    !flags.contains(invalid)
}

/// Maps a raw byte onto the dBm domain `[-192, 63]`.
fn wrap_dbm(raw: u8) -> i32 {
    let value = i32::from(raw);
    if value >= 64 { value - 0x100 } else { value }
}

fn rcpi_to_dbm(raw: u8) -> f64 {
    f64::from(raw) / rcpi::SCALE - rcpi::OFFSET_DBM
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(max_quality: u8, max_level: u8, max_noise: u8) -> CapabilityRange {
        CapabilityRange {
            we_version_compiled: 22,
            max_qual: QualitySample {
                quality: max_quality,
                level: max_level,
                noise: max_noise,
                updated: QualityFlags::empty(),
            },
            ..Default::default()
        }
    }

    fn sample(quality: u8, level: u8, noise: u8, updated: QualityFlags) -> QualitySample {
        QualitySample {
            quality,
            level,
            noise,
            updated,
        }
    }

    #[test]
    fn no_range_is_unavailable() {
        let raw = sample(40, 200, 160, QualityFlags::DBM);
        assert_eq!(interpret(raw, None), SignalReading::Unavailable);
    }

    #[test]
    fn zero_level_without_encoding_flag_is_unavailable() {
        let raw = sample(40, 0, 0, QualityFlags::QUAL_UPDATED);
        assert_eq!(interpret(raw, Some(&range(70, 60, 60))), SignalReading::Unavailable);
    }

    #[test]
    fn zero_level_with_dbm_flag_is_absolute() {
        let raw = sample(40, 0, 0, QualityFlags::DBM);
        assert_eq!(
            interpret(raw, Some(&range(70, 0, 0))),
            SignalReading::AbsoluteDbm {
                quality: Some(RelativeValue { value: 40, max: 70 }),
                signal: Some(0),
                noise: Some(0),
            }
        );
    }

    #[test]
    fn dbm_flag_wraps_signed_bytes() {
        let flags = QualityFlags::DBM | QualityFlags::LEVEL_UPDATED | QualityFlags::NOISE_UPDATED;
        let raw = sample(40, 200, 161, flags);
        match interpret(raw, Some(&range(70, 0, 0))) {
            SignalReading::AbsoluteDbm { signal, noise, .. } => {
                assert_eq!(signal, Some(-56));
                assert_eq!(noise, Some(-95));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn level_above_max_is_absolute_without_flag() {
        let raw = sample(40, 202, 152, QualityFlags::empty());
        match interpret(raw, Some(&range(100, 152, 0))) {
            SignalReading::AbsoluteDbm { signal, noise, .. } => {
                assert_eq!(signal, Some(-54));
                assert_eq!(noise, Some(-104));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn positive_dbm_stays_positive() {
        let raw = sample(0, 63, 10, QualityFlags::DBM);
        match interpret(raw, Some(&range(70, 0, 0))) {
            SignalReading::AbsoluteDbm { signal, noise, .. } => {
                assert_eq!(signal, Some(63));
                assert_eq!(noise, Some(10));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn relative_level_within_max() {
        let raw = sample(30, 50, 5, QualityFlags::empty());
        assert_eq!(
            interpret(raw, Some(&range(70, 60, 20))),
            SignalReading::Percentage {
                quality: Some(RelativeValue { value: 30, max: 70 }),
                level: Some(RelativeValue { value: 50, max: 60 }),
                noise: Some(RelativeValue { value: 5, max: 20 }),
            }
        );
    }

    #[test]
    fn rcpi_flag_converts_half_db_steps() {
        let raw = sample(0, 40, 41, QualityFlags::RCPI);
        match interpret(raw, Some(&range(70, 60, 60))) {
            SignalReading::Rcpi {
                signal_dbm,
                noise_dbm,
                ..
            } => {
                assert_eq!(signal_dbm, Some(-90.0));
                assert_eq!(noise_dbm, Some(-89.5));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rcpi_wins_over_dbm() {
        let raw = sample(0, 40, 0, QualityFlags::RCPI | QualityFlags::DBM);
        assert!(matches!(
            interpret(raw, Some(&range(70, 60, 60))),
            SignalReading::Rcpi { .. }
        ));
    }

    #[test]
    fn invalid_flags_suppress_sub_fields() {
        let flags = QualityFlags::QUAL_INVALID | QualityFlags::NOISE_INVALID;
        assert_eq!(
            interpret(sample(30, 50, 5, flags), Some(&range(70, 60, 20))),
            SignalReading::Percentage {
                quality: None,
                level: Some(RelativeValue { value: 50, max: 60 }),
                noise: None,
            }
        );

        let flags = QualityFlags::DBM | QualityFlags::LEVEL_INVALID;
        assert_eq!(
            interpret(sample(30, 200, 160, flags), Some(&range(70, 0, 0))),
            SignalReading::AbsoluteDbm {
                quality: Some(RelativeValue { value: 30, max: 70 }),
                signal: None,
                noise: Some(-96),
            }
        );

        let flags = QualityFlags::RCPI | QualityFlags::LEVEL_INVALID | QualityFlags::NOISE_INVALID;
        assert_eq!(
            interpret(sample(30, 40, 40, flags), Some(&range(70, 0, 0))),
            SignalReading::Rcpi {
                quality: Some(RelativeValue { value: 30, max: 70 }),
                signal_dbm: None,
                noise_dbm: None,
            }
        );
    }

    #[test]
    fn interpretation_is_deterministic() {
        let raw = sample(12, 34, 56, QualityFlags::LEVEL_UPDATED);
        let range = range(70, 60, 60);
        assert_eq!(interpret(raw, Some(&range)), interpret(raw, Some(&range)));
    }

    #[test]
    fn wrap_dbm_boundaries() {
        assert_eq!(wrap_dbm(0), 0);
        assert_eq!(wrap_dbm(63), 63);
        assert_eq!(wrap_dbm(64), -192);
        assert_eq!(wrap_dbm(255), -1);
    }
}
