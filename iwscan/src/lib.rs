//! A Rust library for scanning Wi-Fi access points through Linux Wireless
//! Extensions.
//!
//! This crate runs the classic `iwlist scan` exchange with a wireless
//! driver and turns its binary event stream into typed records:
//!
//! - Requesting a scan and polling until results are ready
//! - Growing the result buffer when the driver reports it too small
//! - Decoding the tagged event stream, including legacy layouts
//! - Interpreting quality, signal and noise in relative, dBm or RCPI form
//!
//! # Example
//!
//! ```no_run
//! use iwscan::Scanner;
//!
//! # async fn example() -> iwscan::Result<()> {
//! let scanner = Scanner::open()?;
//!
//! for ap in scanner.scan("wlan0").await? {
//!     println!("Cell {:02} - Address: {}", ap.index, ap.address);
//!     if let Some(freq) = ap.frequency {
//!         println!("  Frequency: {:.3} GHz", freq.ghz());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return `Result<T, ScanError>`. The error type separates
//! interfaces that cannot scan, failed scan requests, timeouts, read
//! failures and malformed result streams.
//!
//! # Runtime
//!
//! Scanning is `async` only where it waits for the driver. Waits use
//! `futures-timer`, so the futures run on any executor. Dropping a scan
//! future abandons the scan without touching the interface.
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade for logging. To see
//! log output, add a logging implementation like `env_logger`. For example:
//!
//! ```no_run,ignore
//! env_logger::init();
//! // ...
//! ```

// Internal implementation modules
mod core;
mod types;
mod wext;

// Public API modules
pub mod api;

// Re-exported public API
pub use api::models::{
    AccessPointRecord, CapabilityRange, ChannelFrequency, EssidValue, Frequency, IwFreq,
    MacAddress, NetworkId, OperatingMode, QualityFlags, QualitySample, RelativeValue, ScanConfig,
    ScanError, SignalReading,
};
pub use api::scanner::{Scanner, acquire_and_decode};
pub use crate::core::acquire::{RawScan, acquire};
pub use crate::core::assemble::{RecordAssembler, assemble};
pub use crate::core::decode::{EventStream, IwParam, RawEvent, decode};
pub use crate::core::quality::interpret;
pub use crate::wext::{ControlError, WextSocket, WirelessHandle};

/// A specialized `Result` type for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;
