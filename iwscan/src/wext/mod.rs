//! Wireless Extensions control interface.
//!
//! This module contains the seam between the scan state machine and the
//! kernel: the [`WirelessHandle`] trait, the classification of control-call
//! failures, and the `ioctl` implementation used on real hardware.

mod range;
mod socket;

use std::io;

use crate::api::models::CapabilityRange;

pub(crate) use range::read_iw_freq;
pub use socket::WextSocket;

/// Classified failure of a scan control call.
#[derive(Debug)]
pub enum ControlError {
    /// The result buffer is too small (`E2BIG`). `required` is the length
    /// the driver reported back, if any.
    TooSmall { required: Option<usize> },
    /// Results are not available yet (`EAGAIN`).
    NotReady,
    /// The caller lacks the privilege for this request (`EPERM`).
    PermissionDenied,
    /// Any other OS failure.
    Other(io::Error),
}

impl ControlError {
    /// Classifies an OS error returned by a control call.
    pub fn classify(err: io::Error, reported_len: usize) -> Self {
        match err.raw_os_error() {
            Some(libc::E2BIG) => Self::TooSmall {
                required: (reported_len > 0).then_some(reported_len),
            },
            Some(libc::EAGAIN) => Self::NotReady,
            Some(libc::EPERM) => Self::PermissionDenied,
            _ => Self::Other(err),
        }
    }

    /// Converts back into the OS error it was classified from.
    pub fn into_io_error(self) -> io::Error {
        match self {
            Self::TooSmall { .. } => io::Error::from_raw_os_error(libc::E2BIG),
            Self::NotReady => io::Error::from_raw_os_error(libc::EAGAIN),
            Self::PermissionDenied => io::Error::from_raw_os_error(libc::EPERM),
            Self::Other(err) => err,
        }
    }
}

/// Access to an interface's wireless configuration.
///
/// [`WextSocket`] implements this over `ioctl`. Tests and alternative
/// transports can provide their own implementation; calls are synchronous
/// and expected to return promptly.
pub trait WirelessHandle {
    /// Fetches the interface's capability range (`SIOCGIWRANGE`).
    fn range_info(&self, interface: &str) -> io::Result<CapabilityRange>;

    /// Asks the driver to start a scan (`SIOCSIWSCAN`).
    fn start_scan(&self, interface: &str) -> Result<(), ControlError>;

    /// Reads scan results into `buf` (`SIOCGIWSCAN`), returning the number
    /// of valid bytes written.
    fn read_scan(&self, interface: &str, buf: &mut [u8]) -> Result<usize, ControlError>;

    /// Largest result buffer the transport can describe to the driver,
    /// `None` when unbounded.
    fn max_scan_buffer_len(&self) -> Option<usize> {
        None
    }
}

impl<H: WirelessHandle + ?Sized> WirelessHandle for &H {
    fn range_info(&self, interface: &str) -> io::Result<CapabilityRange> {
        (**self).range_info(interface)
    }

    fn start_scan(&self, interface: &str) -> Result<(), ControlError> {
        (**self).start_scan(interface)
    }

    fn read_scan(&self, interface: &str, buf: &mut [u8]) -> Result<usize, ControlError> {
        (**self).read_scan(interface, buf)
    }

    fn max_scan_buffer_len(&self) -> Option<usize> {
        (**self).max_scan_buffer_len()
    }
}
