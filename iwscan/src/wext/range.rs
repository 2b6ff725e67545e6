//! Parsing of the `struct iw_range` reply to `SIOCGIWRANGE`.
//!
//! Only the fields the scan decoder needs are extracted. The layout is the
//! one used since Wireless Extensions 16; it has no pointer or `long`
//! members, so offsets are the same on 32 and 64 bit hosts.

use log::{debug, warn};

use crate::api::models::{CapabilityRange, ChannelFrequency, IwFreq, QualityFlags, QualitySample};
use crate::types::constants::{layout, limits};

/// Replies shorter than this predate Wireless Extensions 11.
const MIN_RANGE_LEN: usize = 300;
/// Oldest revision using the current `iw_range` layout.
const NATIVE_LAYOUT_VERSION: u8 = 16;
/// Size of a buffer large enough for any `iw_range` revision.
pub(crate) const RANGE_BUFFER_LEN: usize = 1024;

const OFF_MAX_QUAL: usize = 44;
const OFF_WE_VERSION_COMPILED: usize = 280;
const OFF_WE_VERSION_SOURCE: usize = 281;
const OFF_NUM_FREQUENCY: usize = 306;
const OFF_FREQ: usize = 308;

/// Revision reported for replies too short to carry a version.
const ANCIENT_VERSION: u8 = 9;

/// Parses a `SIOCGIWRANGE` reply.
///
/// Replies from drivers older than revision 16 use a different layout. For
/// those only the version is kept; the quality bounds and frequency table
/// are left empty.
pub(crate) fn parse_range(bytes: &[u8]) -> CapabilityRange {
    if bytes.len() < MIN_RANGE_LEN {
        debug!("Range reply of {} bytes, assuming an ancient driver", bytes.len());
        return CapabilityRange {
            we_version_compiled: ANCIENT_VERSION,
            ..Default::default()
        };
    }

    let we_version_compiled = bytes[OFF_WE_VERSION_COMPILED];
    let we_version_source = bytes[OFF_WE_VERSION_SOURCE];

    if we_version_compiled < NATIVE_LAYOUT_VERSION {
        warn!("Wireless Extensions v{we_version_compiled} range layout is not decoded");
        return CapabilityRange {
            we_version_compiled,
            we_version_source,
            ..Default::default()
        };
    }

    let max_qual = QualitySample {
        quality: bytes[OFF_MAX_QUAL],
        level: bytes[OFF_MAX_QUAL + 1],
        noise: bytes[OFF_MAX_QUAL + 2],
        updated: QualityFlags::from_bits_retain(bytes[OFF_MAX_QUAL + 3]),
    };

    let count = usize::from(bytes[OFF_NUM_FREQUENCY]).min(limits::IW_MAX_FREQUENCIES);
    let frequencies = bytes
        .get(OFF_FREQ..)
        .unwrap_or_default()
        .chunks_exact(layout::IW_FREQ_LEN)
        .take(count)
        .map(|raw| {
            let freq = read_iw_freq(raw);
            ChannelFrequency {
                channel: u32::from(freq.i),
                hz: freq.as_f64(),
            }
        })
        .collect();

    CapabilityRange {
        we_version_compiled,
        we_version_source,
        max_qual,
        frequencies,
    }
}

/// Reads a native-endian `struct iw_freq` from the first 8 bytes of `raw`.
pub(crate) fn read_iw_freq(raw: &[u8]) -> IwFreq {
    IwFreq {
        m: i32::from_ne_bytes([raw[0], raw[1], raw[2], raw[3]]),
        e: i16::from_ne_bytes([raw[4], raw[5]]),
        i: raw[6],
        flags: raw[7],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range_bytes(version: u8, freqs: &[(i32, i16, u8)]) -> Vec<u8> {
        let mut bytes = vec![0u8; 568];
        bytes[OFF_MAX_QUAL..OFF_MAX_QUAL + 4].copy_from_slice(&[70, 60, 50, 0x0f]);
        bytes[OFF_WE_VERSION_COMPILED] = version;
        bytes[OFF_WE_VERSION_SOURCE] = version - 1;
        bytes[OFF_NUM_FREQUENCY] = freqs.len() as u8;
        for (n, (m, e, i)) in freqs.iter().enumerate() {
            let at = OFF_FREQ + n * layout::IW_FREQ_LEN;
            bytes[at..at + 4].copy_from_slice(&m.to_ne_bytes());
            bytes[at + 4..at + 6].copy_from_slice(&e.to_ne_bytes());
            bytes[at + 6] = *i;
        }
        bytes
    }

    #[test]
    fn parses_native_layout() {
        let range = parse_range(&range_bytes(22, &[(2412, 6, 1), (2437, 6, 6)]));
        assert_eq!(range.we_version_compiled, 22);
        assert_eq!(range.we_version_source, 21);
        assert_eq!(range.max_qual.quality, 70);
        assert_eq!(range.max_qual.level, 60);
        assert_eq!(range.max_qual.noise, 50);
        assert_eq!(range.frequencies.len(), 2);
        assert_eq!(range.channel_for(2_437_000_000.0), Some(6));
    }

    #[test]
    fn short_reply_is_ancient() {
        let range = parse_range(&[0u8; 120]);
        assert_eq!(range.we_version_compiled, ANCIENT_VERSION);
        assert!(range.frequencies.is_empty());
    }

    #[test]
    fn old_layout_keeps_only_version() {
        let range = parse_range(&range_bytes(15, &[(2412, 6, 1)]));
        assert_eq!(range.we_version_compiled, 15);
        assert!(range.frequencies.is_empty());
        assert_eq!(range.max_qual, QualitySample::default());
    }

    #[test]
    fn frequency_count_is_clamped_to_reply() {
        let mut bytes = range_bytes(21, &[(5180, 6, 36)]);
        bytes[OFF_NUM_FREQUENCY] = 200;
        bytes.truncate(OFF_FREQ + 3 * layout::IW_FREQ_LEN);
        let range = parse_range(&bytes);
        assert_eq!(range.frequencies.len(), 3);
        assert_eq!(range.frequencies[0].channel, 36);
    }
}
