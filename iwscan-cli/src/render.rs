//! Text and JSON output for scan results.

use iwscan::{AccessPointRecord, EssidValue, Frequency, SignalReading};
use serde::Serialize;
use std::fmt::Write;

/// Indent of the cell header line.
const CELL_INDENT: &str = "          ";
/// Indent of the lines below a cell header.
const FIELD_INDENT: &str = "                    ";

#[derive(Serialize)]
struct ScanReport<'a> {
    interface: &'a str,
    cells: &'a [AccessPointRecord],
}

/// Renders records in the layout of `iwlist scan`.
pub fn text(interface: &str, records: &[AccessPointRecord]) -> String {
    let mut out = String::new();
    if records.is_empty() {
        let _ = writeln!(out, "{interface:<9} No scan results");
        return out;
    }

    let _ = writeln!(out, "{interface:<9} Scan completed :");
    for ap in records {
        let _ = writeln!(
            out,
            "{CELL_INDENT}Cell {:02} - Address: {}",
            ap.index, ap.address
        );
        for line in fields(ap) {
            let _ = writeln!(out, "{FIELD_INDENT}{line}");
        }
    }
    out
}

/// Renders records as a JSON document.
pub fn json(interface: &str, records: &[AccessPointRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ScanReport {
        interface,
        cells: records,
    })
}

fn fields(ap: &AccessPointRecord) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(essid) = &ap.essid {
        lines.push(match essid {
            EssidValue::Named {
                name,
                index: Some(index),
            } => format!("ESSID:\"{name}\" [{index}]"),
            EssidValue::Named { name, index: None } => format!("ESSID:\"{name}\""),
            EssidValue::OffAnyHidden => "ESSID:off/any/hidden".to_string(),
        });
    }
    if let Some(protocol) = &ap.protocol {
        lines.push(format!("Protocol:{protocol}"));
    }
    if let Some(network_id) = &ap.network_id {
        lines.push(format!("NWID:{network_id}"));
    }
    if let Some(mode) = ap.mode {
        lines.push(format!("Mode:{mode}"));
    }
    if let Some(frequency) = ap.frequency {
        lines.push(frequency_line(frequency));
    }
    if let Some(signal) = signal_line(&ap.signal) {
        lines.push(signal);
    }
    if !ap.bitrates.is_empty() {
        let rates: Vec<String> = ap.bitrates.iter().map(|r| bitrate(*r)).collect();
        lines.push(format!("Bit Rates:{}", rates.join("; ")));
    }
    for extra in &ap.extra {
        lines.push(format!("Extra:{extra}"));
    }
    lines
}

fn frequency_line(frequency: Frequency) -> String {
    let hz = frequency.hz;
    let value = if hz >= 1e9 {
        format!("{} GHz", hz / 1e9)
    } else if hz >= 1e6 {
        format!("{} MHz", hz / 1e6)
    } else if hz >= 1e3 {
        format!("{} kHz", hz / 1e3)
    } else {
        format!("{hz} Hz")
    };
    match frequency.channel {
        Some(channel) => format!("Frequency:{value} (Channel {channel})"),
        None => format!("Frequency:{value}"),
    }
}

fn signal_line(signal: &SignalReading) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(quality) = signal.quality() {
        parts.push(format!("Quality={}/{}", quality.value, quality.max));
    }
    match *signal {
        SignalReading::Percentage { level, noise, .. } => {
            if let Some(level) = level {
                parts.push(format!("Signal level={}/{}", level.value, level.max));
            }
            if let Some(noise) = noise {
                parts.push(format!("Noise level={}/{}", noise.value, noise.max));
            }
        }
        SignalReading::AbsoluteDbm { signal, noise, .. } => {
            if let Some(signal) = signal {
                parts.push(format!("Signal level={signal} dBm"));
            }
            if let Some(noise) = noise {
                parts.push(format!("Noise level={noise} dBm"));
            }
        }
        SignalReading::Rcpi {
            signal_dbm,
            noise_dbm,
            ..
        } => {
            if let Some(signal) = signal_dbm {
                parts.push(format!("Signal level={signal} dBm"));
            }
            if let Some(noise) = noise_dbm {
                parts.push(format!("Noise level={noise} dBm"));
            }
        }
        SignalReading::Unavailable => {}
    }
    (!parts.is_empty()).then(|| parts.join("  "))
}

fn bitrate(rate: u64) -> String {
    let rate = rate as f64;
    if rate >= 1e9 {
        format!("{} Gb/s", rate / 1e9)
    } else if rate >= 1e6 {
        format!("{} Mb/s", rate / 1e6)
    } else {
        format!("{} kb/s", rate / 1e3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iwscan::{MacAddress, NetworkId, OperatingMode, RelativeValue};

    fn record() -> AccessPointRecord {
        let mut ap = bare_record();
        ap.frequency = Some(Frequency {
            hz: 2_437_000_000.0,
            channel: Some(6),
        });
        ap.mode = Some(OperatingMode::Managed);
        ap.essid = Some(EssidValue::Named {
            name: "home".into(),
            index: None,
        });
        ap.signal = SignalReading::Percentage {
            quality: Some(RelativeValue { value: 40, max: 70 }),
            level: Some(RelativeValue { value: 30, max: 60 }),
            noise: None,
        };
        ap
    }

    fn bare_record() -> AccessPointRecord {
        AccessPointRecord {
            index: 1,
            address: MacAddress([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
            frequency: None,
            mode: None,
            essid: None,
            signal: SignalReading::Unavailable,
            protocol: None,
            network_id: None,
            bitrates: Vec::new(),
            extra: Vec::new(),
        }
    }

    #[test]
    fn test_text_layout() {
        let out = text("wlan0", &[record()]);
        let expected = "\
wlan0     Scan completed :
          Cell 01 - Address: 00:11:22:33:44:55
                    ESSID:\"home\"
                    Mode:Managed
                    Frequency:2.437 GHz (Channel 6)
                    Quality=40/70  Signal level=30/60
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_text_no_results() {
        assert_eq!(text("wlan0", &[]), "wlan0     No scan results\n");
    }

    #[test]
    fn test_optional_fields() {
        let mut ap = bare_record();
        ap.essid = Some(EssidValue::Named {
            name: "lab".into(),
            index: Some(3),
        });
        ap.protocol = Some("IEEE 802.11g".into());
        ap.network_id = Some(NetworkId::OffAny);
        ap.bitrates = vec![1_000_000, 5_500_000, 54_000_000];
        ap.extra = vec!["tsf=0000000000000000".into()];

        let lines = fields(&ap);
        assert_eq!(
            lines,
            vec![
                "ESSID:\"lab\" [3]",
                "Protocol:IEEE 802.11g",
                "NWID:off/any",
                "Bit Rates:1 Mb/s; 5.5 Mb/s; 54 Mb/s",
                "Extra:tsf=0000000000000000",
            ]
        );
    }

    #[test]
    fn test_signal_variants() {
        let dbm = SignalReading::AbsoluteDbm {
            quality: None,
            signal: Some(-56),
            noise: Some(-95),
        };
        assert_eq!(
            signal_line(&dbm).as_deref(),
            Some("Signal level=-56 dBm  Noise level=-95 dBm")
        );

        let rcpi = SignalReading::Rcpi {
            quality: Some(RelativeValue { value: 5, max: 70 }),
            signal_dbm: Some(-89.5),
            noise_dbm: None,
        };
        assert_eq!(
            signal_line(&rcpi).as_deref(),
            Some("Quality=5/70  Signal level=-89.5 dBm")
        );

        assert_eq!(signal_line(&SignalReading::Unavailable), None);
    }

    #[test]
    fn test_bitrate_units() {
        assert_eq!(bitrate(500_000), "500 kb/s");
        assert_eq!(bitrate(11_000_000), "11 Mb/s");
        assert_eq!(bitrate(1_300_000_000), "1.3 Gb/s");
    }

    #[test]
    fn test_frequency_without_channel() {
        let line = frequency_line(Frequency {
            hz: 5_180_000_000.0,
            channel: None,
        });
        assert_eq!(line, "Frequency:5.18 GHz");
    }

    #[test]
    fn test_json_report() {
        let out = json("wlan0", &[record()]).expect("serializable");
        let value: serde_json::Value = serde_json::from_str(&out).expect("valid json");
        assert_eq!(value["interface"], "wlan0");
        let cell = &value["cells"][0];
        assert_eq!(cell["address"], "00:11:22:33:44:55");
        assert_eq!(cell["mode"], "Managed");
        assert_eq!(cell["frequency"]["channel"], 6);
        assert_eq!(cell["essid"]["name"], "home");
        assert_eq!(cell["signal"]["kind"], "percentage");
        assert_eq!(cell["signal"]["level"]["max"], 60);
        assert!(cell["signal"]["noise"].is_null());
    }
}
