//! Constants for the Linux Wireless Extensions interface.
//!
//! These constants correspond to the numeric codes defined in
//! `<linux/wireless.h>` for control requests, stream events, quality
//! flags, and the fixed sizes used by the packed event stream.

/// Control request codes (`SIOC*IW*`).
///
/// The scan stream reuses the `SIOCGIW*` codes as event tags.
pub mod request {
    pub const SIOCGIWNAME: u16 = 0x8B01;
    pub const SIOCGIWNWID: u16 = 0x8B03;
    pub const SIOCGIWFREQ: u16 = 0x8B05;
    pub const SIOCGIWMODE: u16 = 0x8B07;
    pub const SIOCGIWRANGE: u16 = 0x8B0B;
    pub const SIOCGIWAP: u16 = 0x8B15;
    pub const SIOCSIWSCAN: u16 = 0x8B18;
    pub const SIOCGIWSCAN: u16 = 0x8B19;
    pub const SIOCGIWESSID: u16 = 0x8B1B;
    pub const SIOCGIWRATE: u16 = 0x8B21;
}

/// Event codes that only appear in event streams (`IWEV*`).
pub mod event {
    pub const IWEVQUAL: u16 = 0x8C01;
    pub const IWEVCUSTOM: u16 = 0x8C02;
}

/// Protocol revisions that change scanning behaviour.
pub mod version {
    /// Oldest Wireless Extensions revision able to scan.
    pub const MIN_SCAN: u8 = 14;
    /// Revisions after this one report `E2BIG` with a length hint.
    pub const LAST_FIXED_SCAN_BUFFER: u8 = 16;
    /// Revisions up to this one embed a host pointer in pointer events.
    pub const LAST_INLINE_POINTER: u8 = 18;
}

/// Payload limits.
pub mod limits {
    /// Scan buffer size every revision accepts.
    pub const IW_SCAN_MAX_DATA: usize = 4096;
    pub const IW_ESSID_MAX_SIZE: usize = 32;
    pub const IW_CUSTOM_MAX: usize = 256;
    pub const IW_MAX_FREQUENCIES: usize = 32;
    /// Lowest value treated as a frequency rather than a channel number.
    pub const KILO: f64 = 1e3;
}

/// Fixed sizes of the packed stream layout.
pub mod layout {
    /// Packed event header: `len: u16` followed by `cmd: u16`.
    pub const IW_EV_LCP_PK_LEN: usize = 4;
    /// Width of the host pointer inside `struct iw_point`.
    pub const IW_EV_POINT_OFF: usize = std::mem::size_of::<usize>();
    /// `struct sockaddr`.
    pub const SOCKADDR_LEN: usize = 16;
    /// `struct iw_freq`.
    pub const IW_FREQ_LEN: usize = 8;
    /// `struct iw_param`.
    pub const IW_PARAM_LEN: usize = 8;
    /// `struct iw_quality`.
    pub const IW_QUALITY_LEN: usize = 4;
    /// Fixed part of `struct iw_point` in the stream (length + flags).
    pub const IW_POINT_FIXED_LEN: usize = 4;
    pub const IFNAMSIZ: usize = 16;
    /// Fixed padding added by 64-bit kernels for 32-bit userspace.
    pub const COMPAT_PAD: usize = 4;
}

/// Bits of the `flags` field in ESSID events.
pub mod essid_flags {
    pub const IW_ENCODE_INDEX: u16 = 0x00FF;
}

/// Operating mode names, indexed by `SIOCGIWMODE` value.
pub mod mode {
    pub const NAMES: [&str; 7] = [
        "Auto",
        "Ad-Hoc",
        "Managed",
        "Master",
        "Repeater",
        "Secondary",
        "Monitor",
    ];
    /// Label for values past the end of [`NAMES`].
    pub const UNKNOWN: &str = "Unknown/bug";
}

/// RCPI conversion, IEEE 802.11k: `RCPI = (dBm + 110) * 2`.
pub mod rcpi {
    pub const OFFSET_DBM: f64 = 110.0;
    pub const SCALE: f64 = 2.0;
}

/// Timeout constants for scan polling.
///
/// The driver gives no completion notification on this path, so the
/// acquirer sleeps between result reads.
pub mod timeouts {
    use std::time::Duration;

    /// Total budget for one scan (15 seconds).
    const SCAN_DEADLINE_SECS: u64 = 15;

    /// Delay between requesting a scan and the first read attempt.
    const FIRST_WAIT_MS: u64 = 250;

    /// Delay between read attempts while results are not ready.
    const POLL_INTERVAL_MS: u64 = 100;

    /// Returns the total scan deadline.
    pub fn scan_deadline() -> Duration {
        Duration::from_secs(SCAN_DEADLINE_SECS)
    }

    /// Returns the wait before the first read.
    pub fn first_wait() -> Duration {
        Duration::from_millis(FIRST_WAIT_MS)
    }

    /// Returns the wait between read attempts.
    pub fn poll_interval() -> Duration {
        Duration::from_millis(POLL_INTERVAL_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names_cover_all_wireless_modes() {
        assert_eq!(mode::NAMES.len(), 7);
        assert_eq!(mode::NAMES[2], "Managed");
    }

    #[test]
    fn test_request_codes_are_in_wireless_range() {
        for code in [
            request::SIOCGIWNAME,
            request::SIOCGIWFREQ,
            request::SIOCGIWAP,
            request::SIOCGIWSCAN,
            request::SIOCGIWESSID,
        ] {
            assert_eq!(code & 0xFF00, 0x8B00);
        }
        assert_eq!(event::IWEVQUAL & 0xFF00, 0x8C00);
    }

    #[test]
    fn test_default_timeouts() {
        assert_eq!(timeouts::scan_deadline().as_millis(), 15_000);
        assert_eq!(timeouts::first_wait().as_millis(), 250);
        assert_eq!(timeouts::poll_interval().as_millis(), 100);
    }
}
