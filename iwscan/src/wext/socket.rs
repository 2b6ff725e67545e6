//! `ioctl` transport for Wireless Extensions.
//!
//! Wireless requests are accepted on any socket; a datagram socket is
//! opened once and reused for every request.

#![allow(unsafe_code)]

use log::debug;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::ptr;

use super::range::{RANGE_BUFFER_LEN, parse_range};
use super::{ControlError, WirelessHandle};
use crate::Result;
use crate::api::models::{CapabilityRange, ScanError};
use crate::types::constants::{layout, request};

/// The `iw_point` length field is 16 bits wide.
const MAX_REQUEST_LEN: usize = u16::MAX as usize;

/// `struct iw_point`.
#[repr(C)]
#[derive(Clone, Copy)]
struct IwPoint {
    pointer: *mut libc::c_void,
    length: u16,
    flags: u16,
}

/// `union iwreq_data`, reduced to the members used here.
#[repr(C)]
union IwReqData {
    data: IwPoint,
    // Sizes the union on 32 bit hosts.
    #[allow(dead_code)]
    name: [libc::c_char; layout::IFNAMSIZ],
}

/// `struct iwreq`.
#[repr(C)]
struct IwReq {
    ifr_name: [libc::c_char; layout::IFNAMSIZ],
    u: IwReqData,
}

impl IwReq {
    fn new(interface: &str, buf: Option<&mut [u8]>) -> io::Result<Self> {
        let name = interface.as_bytes();
        if name.is_empty() || name.len() >= layout::IFNAMSIZ || name.contains(&0) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid interface name {interface:?}"),
            ));
        }

        let mut ifr_name = [0 as libc::c_char; layout::IFNAMSIZ];
        for (dst, src) in ifr_name.iter_mut().zip(name) {
            *dst = *src as libc::c_char;
        }

        let (pointer, length) = match buf {
            Some(buf) => (
                buf.as_mut_ptr().cast(),
                u16::try_from(buf.len().min(MAX_REQUEST_LEN)).unwrap_or(u16::MAX),
            ),
            None => (ptr::null_mut(), 0),
        };

        Ok(Self {
            ifr_name,
            u: IwReqData {
                data: IwPoint {
                    pointer,
                    length,
                    flags: 0,
                },
            },
        })
    }

    fn data_length(&self) -> usize {
        // SAFETY: every request built by `new` initialises the `data` member.
        usize::from(unsafe { self.u.data.length })
    }
}

/// Wireless Extensions handle backed by a kernel socket.
///
/// # Example
///
/// ```no_run
/// use iwscan::{WextSocket, WirelessHandle};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let socket = WextSocket::open()?;
/// let range = socket.range_info("wlan0")?;
/// println!("WE-{}", range.we_version_compiled);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WextSocket {
    fd: OwnedFd,
}

impl WextSocket {
    /// Opens a control socket.
    ///
    /// Tries the address families in turn, since a kernel may be built
    /// without some of them.
    pub fn open() -> Result<Self> {
        let mut last_err = io::Error::from_raw_os_error(libc::EAFNOSUPPORT);
        for family in [libc::AF_INET, libc::AF_INET6, libc::AF_UNIX] {
            // SAFETY: plain syscall, no pointers involved.
            let fd = unsafe { libc::socket(family, libc::SOCK_DGRAM | libc::SOCK_CLOEXEC, 0) };
            if fd >= 0 {
                debug!("Opened wireless control socket (family {family})");
                // SAFETY: `fd` was just returned by socket(2) and is owned by nobody else.
                return Ok(Self {
                    fd: unsafe { OwnedFd::from_raw_fd(fd) },
                });
            }
            last_err = io::Error::last_os_error();
        }
        Err(ScanError::Socket(last_err))
    }

    fn ioctl(&self, code: u16, wrq: &mut IwReq) -> io::Result<()> {
        // SAFETY: `wrq` is a valid `struct iwreq`; any buffer it points to
        // is borrowed for the duration of this call and its length is set
        // no larger than the buffer.
        let rc = unsafe {
            libc::ioctl(
                self.fd.as_raw_fd(),
                libc::c_ulong::from(code) as _,
                wrq as *mut IwReq,
            )
        };
        if rc < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }
}

impl WirelessHandle for WextSocket {
    fn range_info(&self, interface: &str) -> io::Result<CapabilityRange> {
        let mut buffer = [0u8; RANGE_BUFFER_LEN];
        let mut wrq = IwReq::new(interface, Some(&mut buffer[..]))?;
        self.ioctl(request::SIOCGIWRANGE, &mut wrq)?;
        let len = wrq.data_length().min(RANGE_BUFFER_LEN);
        Ok(parse_range(&buffer[..len]))
    }

    fn start_scan(&self, interface: &str) -> std::result::Result<(), ControlError> {
        let mut wrq = IwReq::new(interface, None).map_err(ControlError::Other)?;
        self.ioctl(request::SIOCSIWSCAN, &mut wrq)
            .map_err(|err| ControlError::classify(err, 0))
    }

    fn read_scan(
        &self,
        interface: &str,
        buf: &mut [u8],
    ) -> std::result::Result<usize, ControlError> {
        let mut wrq = IwReq::new(interface, Some(buf)).map_err(ControlError::Other)?;
        match self.ioctl(request::SIOCGIWSCAN, &mut wrq) {
            Ok(()) => Ok(wrq.data_length()),
            Err(err) => Err(ControlError::classify(err, wrq.data_length())),
        }
    }

    fn max_scan_buffer_len(&self) -> Option<usize> {
        Some(MAX_REQUEST_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iwreq_rejects_bad_names() {
        assert!(IwReq::new("", None).is_err());
        assert!(IwReq::new("an-interface-name-too-long", None).is_err());
        assert!(IwReq::new("wl\0an", None).is_err());
    }

    #[test]
    fn iwreq_carries_buffer_length() {
        let mut buf = vec![0u8; 4096];
        let wrq = IwReq::new("wlan0", Some(&mut buf[..])).expect("valid name");
        assert_eq!(wrq.data_length(), 4096);
        assert_eq!(wrq.ifr_name[0], b'w' as libc::c_char);
        assert_eq!(wrq.ifr_name[5], 0);
    }

    #[test]
    fn iwreq_length_saturates_at_u16() {
        let mut buf = vec![0u8; 100_000];
        let wrq = IwReq::new("wlan0", Some(&mut buf[..])).expect("valid name");
        assert_eq!(wrq.data_length(), MAX_REQUEST_LEN);
    }

    #[test]
    fn iwreq_matches_kernel_size() {
        assert_eq!(std::mem::size_of::<IwReq>(), 32);
    }
}
