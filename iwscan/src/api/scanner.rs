//! High-level scan entry points.

use log::debug;

use crate::Result;
use crate::api::models::{AccessPointRecord, CapabilityRange, ScanConfig, ScanError};
use crate::core::acquire::{RawScan, acquire};
use crate::wext::{WextSocket, WirelessHandle};

/// Wireless scanner bound to a control handle.
///
/// This is the main entry point of the crate. It owns a [`WirelessHandle`]
/// (a [`WextSocket`] by default) and the [`ScanConfig`] applied to every
/// scan.
///
/// # Scanning an Interface
///
/// ```no_run
/// use iwscan::Scanner;
///
/// # async fn example() -> iwscan::Result<()> {
/// let scanner = Scanner::open()?;
/// let records = scanner.scan("wlan0").await?;
/// for ap in &records {
///     println!("{} {:?}", ap.address, ap.essid);
/// }
/// # Ok(())
/// # }
/// ```
///
/// # Custom Timing
///
/// ```no_run
/// use iwscan::{ScanConfig, Scanner};
/// use std::time::Duration;
///
/// # async fn example() -> iwscan::Result<()> {
/// let config = ScanConfig::new()
///     .with_deadline(Duration::from_secs(5))
///     .with_poll_interval(Duration::from_millis(50));
/// let scanner = Scanner::open_with_config(config)?;
/// let records = scanner.scan("wlan0").await?;
/// # Ok(())
/// # }
/// ```
///
/// # Other Transports
///
/// Any [`WirelessHandle`] can drive a scanner, which is how the tests feed
/// recorded driver answers through the full pipeline:
///
/// ```ignore
/// let scanner = Scanner::with_handle(my_handle, ScanConfig::default());
/// ```
#[derive(Debug)]
pub struct Scanner<H = WextSocket> {
    handle: H,
    config: ScanConfig,
}

impl Scanner<WextSocket> {
    /// Opens a control socket with the default configuration.
    pub fn open() -> Result<Self> {
        Self::open_with_config(ScanConfig::default())
    }

    /// Opens a control socket with a custom configuration.
    pub fn open_with_config(config: ScanConfig) -> Result<Self> {
        let handle = WextSocket::open()?;
        Ok(Self { handle, config })
    }
}

impl<H: WirelessHandle> Scanner<H> {
    /// Creates a scanner over an existing handle.
    pub fn with_handle(handle: H, config: ScanConfig) -> Self {
        Self { handle, config }
    }

    /// Returns the configuration used for scans.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Returns the underlying handle.
    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// Fetches the capability range of `interface`.
    pub fn range_info(&self, interface: &str) -> Result<CapabilityRange> {
        self.handle
            .range_info(interface)
            .map_err(|e| ScanError::UnsupportedInterface {
                interface: interface.to_string(),
                reason: e.to_string(),
            })
    }

    /// Runs a scan and returns the undecoded result buffer.
    pub async fn acquire(&self, interface: &str) -> Result<RawScan> {
        acquire(&self.handle, interface, &self.config).await
    }

    /// Runs a scan and returns one record per access point found.
    ///
    /// An empty vector means the scan completed without results.
    pub async fn scan(&self, interface: &str) -> Result<Vec<AccessPointRecord>> {
        acquire_and_decode(&self.handle, interface, &self.config).await
    }
}

/// Runs a scan on `handle` and decodes the results.
///
/// Equivalent to [`Scanner::scan`] without constructing a scanner.
pub async fn acquire_and_decode<H>(
    handle: &H,
    interface: &str,
    config: &ScanConfig,
) -> Result<Vec<AccessPointRecord>>
where
    H: WirelessHandle + ?Sized,
{
    let raw = acquire(handle, interface, config).await?;
    if raw.is_empty() {
        debug!("No scan results on {interface}");
        return Ok(Vec::new());
    }
    raw.records()
}
