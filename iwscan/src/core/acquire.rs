//! Scan request and result polling.
//!
//! A scan is a request followed by reads until the driver has results. The
//! driver answers a read with "not ready" while scanning and with "too big"
//! when the results do not fit, in which case the buffer grows and the read
//! is retried at once. Waits between reads use [`futures_timer::Delay`], so
//! any executor can drive the acquisition; dropping the future abandons it.

use futures_timer::Delay;
use log::{debug, warn};
use std::io;
use std::time::Duration;

use crate::Result;
use crate::api::models::{AccessPointRecord, CapabilityRange, ScanConfig, ScanError};
use crate::core::assemble::assemble;
use crate::core::decode::{EventStream, decode};
use crate::types::constants::version;
use crate::wext::{ControlError, WirelessHandle};

/// Lower bound on the poll interval, so a zero interval cannot spin.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Result buffer of a completed scan.
#[derive(Debug, Clone)]
pub struct RawScan {
    /// Capabilities of the scanned interface.
    pub range: CapabilityRange,
    /// Result buffer as filled by the driver.
    pub buffer: Vec<u8>,
    /// Number of meaningful bytes at the start of `buffer`.
    pub valid_length: usize,
}

impl RawScan {
    /// Whether the driver returned no results.
    pub fn is_empty(&self) -> bool {
        self.valid_length == 0
    }

    /// Iterates over the events of the result buffer.
    pub fn events(&self) -> EventStream<'_> {
        decode(
            &self.buffer,
            self.valid_length,
            self.range.we_version_compiled,
        )
    }

    /// Decodes the buffer into access point records.
    pub fn records(&self) -> Result<Vec<AccessPointRecord>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        assemble(self.events(), Some(&self.range))
    }
}

/// Runs one scan on `interface` and returns the raw results.
///
/// # Errors
///
/// - [`ScanError::UnsupportedInterface`] when the interface has no range
///   information or speaks a protocol older than version 14
/// - [`ScanError::ScanStartFailed`] when the scan request fails for a reason
///   other than missing privileges
/// - [`ScanError::Timeout`] when the deadline runs out while results are not
///   ready
/// - [`ScanError::ReadFailed`] for any other read failure, or when the
///   results outgrow [`ScanConfig::max_buffer_len`] or the largest buffer
///   the handle can pass to the driver
///
/// Without the privilege to start a scan the request is skipped and the
/// results of the last scan are read instead.
pub async fn acquire<H>(handle: &H, interface: &str, config: &ScanConfig) -> Result<RawScan>
where
    H: WirelessHandle + ?Sized,
{
    let range = handle
        .range_info(interface)
        .map_err(|e| ScanError::UnsupportedInterface {
            interface: interface.to_string(),
            reason: e.to_string(),
        })?;

    if range.we_version_compiled < version::MIN_SCAN {
        return Err(ScanError::UnsupportedInterface {
            interface: interface.to_string(),
            reason: format!(
                "Wireless Extensions version {} is too old",
                range.we_version_compiled
            ),
        });
    }

    let mut wait = match handle.start_scan(interface) {
        Ok(()) => {
            debug!("Scan started on {interface}");
            config.first_wait
        }
        Err(ControlError::PermissionDenied) => {
            warn!("Not permitted to start a scan on {interface}, reading previous results");
            Duration::ZERO
        }
        Err(e) => {
            return Err(ScanError::ScanStartFailed {
                interface: interface.to_string(),
                source: e.into_io_error(),
            });
        }
    };

    let poll_interval = config.poll_interval.max(MIN_POLL_INTERVAL);
    // The first wait is charged to the deadline like every poll.
    let mut remaining = config.deadline.saturating_sub(wait);
    let transport_limit = handle.max_scan_buffer_len();
    let mut buffer = vec![0u8; config.initial_buffer_len.max(1)];

    loop {
        if !wait.is_zero() {
            Delay::new(wait).await;
        }

        match handle.read_scan(interface, &mut buffer) {
            Ok(valid_length) => {
                debug!("Read {valid_length} bytes of scan results from {interface}");
                return Ok(RawScan {
                    range,
                    buffer,
                    valid_length,
                });
            }
            Err(ControlError::TooSmall { required })
                if range.we_version_compiled > version::LAST_FIXED_SCAN_BUFFER =>
            {
                let mut new_len = match required {
                    Some(len) if len > buffer.len() => len,
                    _ => buffer.len().saturating_mul(2),
                };
                if let Some(limit) = transport_limit.filter(|limit| buffer.len() < *limit) {
                    new_len = new_len.min(limit);
                }
                let over_transport = transport_limit.is_some_and(|limit| new_len > limit);
                let over_config = config.max_buffer_len.is_some_and(|max| new_len > max);
                if over_transport || over_config {
                    warn!(
                        "Scan results on {interface} need more than {} bytes",
                        buffer.len()
                    );
                    return Err(ScanError::ReadFailed {
                        interface: interface.to_string(),
                        source: io::Error::from_raw_os_error(libc::E2BIG),
                    });
                }
                debug!(
                    "Scan buffer too small, growing from {} to {new_len} bytes",
                    buffer.len()
                );
                buffer.resize(new_len, 0);
                wait = Duration::ZERO;
            }
            Err(ControlError::NotReady) => {
                remaining = remaining.saturating_sub(poll_interval);
                if remaining.is_zero() {
                    warn!("Scan on {interface} timed out");
                    return Err(ScanError::Timeout {
                        interface: interface.to_string(),
                        waited: config.deadline,
                    });
                }
                wait = poll_interval;
            }
            Err(e) => {
                return Err(ScanError::ReadFailed {
                    interface: interface.to_string(),
                    source: e.into_io_error(),
                });
            }
        }
    }
}
