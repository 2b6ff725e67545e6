use bitflags::bitflags;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::types::constants::{limits, mode, timeouts};

/// Hardware (MAC) address of an access point.
///
/// Displays and serializes as six colon-separated uppercase hex octets,
/// e.g. `00:11:22:AA:BB:CC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress(pub [u8; 6]);

impl Display for MacAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Raw `struct iw_freq`: a frequency (`m * 10^e` Hz) or a channel number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IwFreq {
    /// Mantissa.
    pub m: i32,
    /// Decimal exponent.
    pub e: i16,
    /// Channel index, meaningful inside a range table.
    pub i: u8,
    /// Fixed/auto flag.
    pub flags: u8,
}

impl IwFreq {
    /// Returns the value as a float.
    ///
    /// Negative exponents are ignored, matching the kernel's encoding.
    pub fn as_f64(&self) -> f64 {
        let mut value = f64::from(self.m);
        for _ in 0..self.e.max(0) {
            value *= 10.0;
        }
        value
    }

    /// Whether the value is a channel number rather than a frequency.
    pub fn is_channel(&self) -> bool {
        self.as_f64() < limits::KILO
    }
}

/// One entry of an interface's frequency table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelFrequency {
    /// Channel number.
    pub channel: u32,
    /// Frequency in Hz.
    pub hz: f64,
}

/// Interface capabilities needed to decode a scan.
///
/// Fetched once per scan with `SIOCGIWRANGE` and never modified
/// afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CapabilityRange {
    /// Wireless Extensions revision the driver was compiled against.
    pub we_version_compiled: u8,
    /// Wireless Extensions revision of the driver source.
    pub we_version_source: u8,
    /// Upper bounds of quality, level and noise.
    pub max_qual: QualitySample,
    /// Frequency-to-channel table.
    pub frequencies: Vec<ChannelFrequency>,
}

impl CapabilityRange {
    /// Resolves a frequency in Hz to a channel number.
    ///
    /// Values below 1 kHz are already channel numbers and never resolve.
    pub fn channel_for(&self, hz: f64) -> Option<u32> {
        if hz < limits::KILO {
            return None;
        }
        self.frequencies
            .iter()
            .find(|entry| entry.hz == hz)
            .map(|entry| entry.channel)
    }

    /// Resolves a channel number to its frequency in Hz.
    pub fn frequency_for(&self, channel: u32) -> Option<f64> {
        self.frequencies
            .iter()
            .find(|entry| entry.channel == channel)
            .map(|entry| entry.hz)
    }
}

bitflags! {
    /// The `updated` byte of `struct iw_quality`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct QualityFlags: u8 {
        const QUAL_UPDATED = 0x01;
        const LEVEL_UPDATED = 0x02;
        const NOISE_UPDATED = 0x04;
        /// Level and noise are absolute dBm values.
        const DBM = 0x08;
        const QUAL_INVALID = 0x10;
        const LEVEL_INVALID = 0x20;
        const NOISE_INVALID = 0x40;
        /// Level and noise are IEEE 802.11k RCPI values.
        const RCPI = 0x80;
    }
}

/// Raw `struct iw_quality` as it appears on the wire.
///
/// Meaningless without the interface's [`CapabilityRange`]; see
/// [`interpret`](crate::interpret).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct QualitySample {
    pub quality: u8,
    pub level: u8,
    pub noise: u8,
    pub updated: QualityFlags,
}

/// A relative value and the maximum it is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelativeValue {
    pub value: u8,
    pub max: u8,
}

/// Signal statistics of an access point, decoded from a [`QualitySample`].
///
/// Link quality is always relative and rides along with every available
/// variant. Sub-fields the driver flagged invalid are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalReading {
    /// Level and noise relative to the interface maximum.
    Percentage {
        quality: Option<RelativeValue>,
        level: Option<RelativeValue>,
        noise: Option<RelativeValue>,
    },
    /// Level and noise in dBm.
    AbsoluteDbm {
        quality: Option<RelativeValue>,
        signal: Option<i32>,
        noise: Option<i32>,
    },
    /// Level and noise in dBm, converted from RCPI.
    Rcpi {
        quality: Option<RelativeValue>,
        signal_dbm: Option<f64>,
        noise_dbm: Option<f64>,
    },
    /// No range information, or the sample carried nothing usable.
    Unavailable,
}

impl SignalReading {
    /// Returns the link quality, if reported.
    pub fn quality(&self) -> Option<RelativeValue> {
        match self {
            Self::Percentage { quality, .. }
            | Self::AbsoluteDbm { quality, .. }
            | Self::Rcpi { quality, .. } => *quality,
            Self::Unavailable => None,
        }
    }
}

/// Operating mode advertised by an access point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingMode {
    Auto,
    AdHoc,
    Managed,
    Master,
    Repeater,
    Secondary,
    Monitor,
    /// Out-of-range mode value reported by the driver.
    Unknown(u32),
}

impl From<u32> for OperatingMode {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::Auto,
            1 => Self::AdHoc,
            2 => Self::Managed,
            3 => Self::Master,
            4 => Self::Repeater,
            5 => Self::Secondary,
            6 => Self::Monitor,
            v => Self::Unknown(v),
        }
    }
}

impl OperatingMode {
    /// Returns the numeric mode, clamped to 7 for unknown values.
    pub fn code(&self) -> u32 {
        match self {
            Self::Auto => 0,
            Self::AdHoc => 1,
            Self::Managed => 2,
            Self::Master => 3,
            Self::Repeater => 4,
            Self::Secondary => 5,
            Self::Monitor => 6,
            Self::Unknown(_) => mode::NAMES.len() as u32,
        }
    }

    /// Returns the display label for this mode.
    pub fn label(&self) -> &'static str {
        mode::NAMES
            .get(self.code() as usize)
            .copied()
            .unwrap_or(mode::UNKNOWN)
    }
}

impl Display for OperatingMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for OperatingMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// The network name of an access point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EssidValue {
    /// A name, with the driver's ESSID index when it is greater than one.
    Named { name: String, index: Option<u16> },
    /// The access point hides its name, or accepts any.
    OffAnyHidden,
}

impl Display for EssidValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named {
                name,
                index: Some(index),
            } => write!(f, "'{name}' [{index}]"),
            Self::Named { name, index: None } => write!(f, "{name}"),
            Self::OffAnyHidden => write!(f, "off/any/hidden"),
        }
    }
}

/// Pre-802.11 network id (NWID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NetworkId {
    Value { id: i32 },
    OffAny,
}

impl Display for NetworkId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value { id } => write!(f, "{id:X}"),
            Self::OffAny => write!(f, "off/any"),
        }
    }
}

/// Operating frequency of an access point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frequency {
    /// Frequency in Hz.
    pub hz: f64,
    /// Channel number, when the interface's frequency table resolves it.
    pub channel: Option<u32>,
}

impl Frequency {
    /// Returns the frequency in GHz.
    pub fn ghz(&self) -> f64 {
        self.hz / 1e9
    }
}

/// One access point found by a scan.
///
/// Fields are filled from the events that follow the access point's address
/// in the scan stream, up to the next address.
///
/// # Example
///
/// ```no_run
/// use iwscan::Scanner;
///
/// # async fn example() -> iwscan::Result<()> {
/// let scanner = Scanner::open()?;
/// for ap in scanner.scan("wlan0").await? {
///     println!("Cell {:02} - Address: {}", ap.index, ap.address);
///     if let Some(essid) = &ap.essid {
///         println!("  ESSID: {essid}");
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessPointRecord {
    /// Position in the scan, starting at 1.
    pub index: u32,
    /// Access point MAC address (BSSID).
    pub address: MacAddress,
    pub frequency: Option<Frequency>,
    pub mode: Option<OperatingMode>,
    pub essid: Option<EssidValue>,
    pub signal: SignalReading,
    /// Protocol name reported by the driver (e.g. `IEEE 802.11bgn`).
    pub protocol: Option<String>,
    pub network_id: Option<NetworkId>,
    /// Supported bit rates in bit/s.
    pub bitrates: Vec<u64>,
    /// Driver-specific custom strings.
    pub extra: Vec<String>,
}

impl AccessPointRecord {
    pub(crate) fn new(index: u32, address: MacAddress) -> Self {
        Self {
            index,
            address,
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
}

/// Timing and buffer settings for one scan.
///
/// Defaults follow the classic `iwlist` behaviour: a 15 second budget,
/// 250 ms before the first read, 100 ms between reads, and a 4096 byte
/// initial buffer with no upper bound.
///
/// # Example
///
/// ```
/// use iwscan::ScanConfig;
/// use std::time::Duration;
///
/// let config = ScanConfig::new()
///     .with_deadline(Duration::from_secs(5))
///     .with_max_buffer_len(Some(64 * 1024));
/// assert_eq!(config.deadline, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Total time the acquirer may spend waiting for results.
    pub deadline: Duration,
    /// Wait between a successful scan request and the first read.
    pub first_wait: Duration,
    /// Wait between reads while results are not ready.
    pub poll_interval: Duration,
    /// Initial result buffer size.
    pub initial_buffer_len: usize,
    /// Largest buffer the acquirer will grow to, `None` for unbounded.
    pub max_buffer_len: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            deadline: timeouts::scan_deadline(),
            first_wait: timeouts::first_wait(),
            poll_interval: timeouts::poll_interval(),
            initial_buffer_len: limits::IW_SCAN_MAX_DATA,
            max_buffer_len: None,
        }
    }
}

impl ScanConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total wait budget.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Sets the wait before the first read.
    pub fn with_first_wait(mut self, wait: Duration) -> Self {
        self.first_wait = wait;
        self
    }

    /// Sets the wait between reads.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the initial buffer size. Zero is raised to one byte.
    pub fn with_initial_buffer_len(mut self, len: usize) -> Self {
        self.initial_buffer_len = len.max(1);
        self
    }

    /// Caps buffer growth.
    pub fn with_max_buffer_len(mut self, max: Option<usize>) -> Self {
        self.max_buffer_len = max;
        self
    }
}

/// Errors that can occur while acquiring or decoding a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The wireless control channel could not be opened.
    #[error("failed to open wireless control socket: {0}")]
    Socket(#[source] io::Error),

    /// The interface has no range information or its protocol is too old.
    #[error("{interface}: interface doesn't support scanning: {reason}")]
    UnsupportedInterface { interface: String, reason: String },

    /// The scan request failed for a reason other than permissions.
    #[error("{interface}: interface doesn't support scanning: {source}")]
    ScanStartFailed {
        interface: String,
        #[source]
        source: io::Error,
    },

    /// Results did not become available within the deadline.
    #[error("{interface}: no scan results after {waited:?}")]
    Timeout { interface: String, waited: Duration },

    /// Reading the results failed.
    #[error("{interface}: failed to read scan data: {source}")]
    ReadFailed {
        interface: String,
        #[source]
        source: io::Error,
    },

    /// An event claims more bytes than remain in the stream.
    #[error(
        "scan stream truncated at offset {offset}: event needs {declared} bytes, {remaining} remain"
    )]
    TruncatedStream {
        offset: usize,
        declared: usize,
        remaining: usize,
    },

    /// An event is too short to hold its own header.
    #[error("malformed scan event at offset {offset}: length {len}")]
    MalformedEvent { offset: usize, len: usize },
}
