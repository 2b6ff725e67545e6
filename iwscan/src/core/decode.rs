//! Event stream decoding.
//!
//! A scan result is a flat sequence of packed events. Each event starts with
//! a 4-byte header (`len: u16`, `cmd: u16`, native endian) where `len`
//! covers the header itself. The payload layout depends on the command's
//! header type and, for pointer payloads, on the protocol revision.
//!
//! Fixed-size payloads may carry several values under one header (bit rate
//! lists do). The stream yields one event per value and tracks the current
//! value group itself.

use log::{debug, warn};

use crate::Result;
use crate::api::models::{IwFreq, MacAddress, QualityFlags, QualitySample, ScanError};
use crate::types::constants::{event, layout, limits, request, version};
use crate::wext::read_iw_freq;

/// Raw `struct iw_param`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IwParam {
    pub value: i32,
    pub fixed: bool,
    pub disabled: bool,
    pub flags: u16,
}

/// One decoded scan event.
///
/// Byte payloads borrow from the scan buffer. Pointer payloads the driver
/// advertised inconsistently are `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawEvent<'a> {
    /// `SIOCGIWAP`: starts a new access point.
    Address(MacAddress),
    /// `SIOCGIWFREQ`: frequency or channel.
    Frequency(IwFreq),
    /// `SIOCGIWMODE`: operating mode code.
    Mode(u32),
    /// `SIOCGIWNAME`: protocol name, NUL padding removed.
    Protocol(&'a [u8]),
    /// `SIOCGIWNWID`.
    NetworkId(IwParam),
    /// `SIOCGIWESSID`: network name bytes and the ESSID flags.
    Essid {
        flags: u16,
        payload: Option<&'a [u8]>,
    },
    /// `IWEVQUAL`.
    Quality(QualitySample),
    /// `SIOCGIWRATE`: one bit rate; `last` closes the rate group.
    Bitrate { param: IwParam, last: bool },
    /// `IWEVCUSTOM`: driver-specific text.
    Custom(Option<&'a [u8]>),
    /// Any other command.
    Unknown { cmd: u16 },
}

/// Payload header types, as in `<linux/wireless.h>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderType {
    Char,
    Uint,
    Freq,
    Addr,
    Point,
    Param,
    Qual,
}

impl HeaderType {
    /// Size of one value of a fixed-size payload.
    fn value_len(self) -> usize {
        match self {
            Self::Char => layout::IFNAMSIZ,
            Self::Uint => 4,
            Self::Freq => layout::IW_FREQ_LEN,
            Self::Addr => layout::SOCKADDR_LEN,
            Self::Point => layout::IW_POINT_FIXED_LEN,
            Self::Param => layout::IW_PARAM_LEN,
            Self::Qual => layout::IW_QUALITY_LEN,
        }
    }
}

/// What the decoder knows about a command.
#[derive(Debug, Clone, Copy)]
struct Descriptor {
    header: HeaderType,
    /// Maximum token count of a pointer payload, `None` when unbounded.
    max_tokens: Option<usize>,
}

fn descriptor(cmd: u16) -> Option<Descriptor> {
    let (header, max_tokens) = match cmd {
        request::SIOCGIWNAME => (HeaderType::Char, None),
        request::SIOCGIWNWID => (HeaderType::Param, None),
        request::SIOCGIWFREQ => (HeaderType::Freq, None),
        request::SIOCGIWMODE => (HeaderType::Uint, None),
        request::SIOCGIWAP => (HeaderType::Addr, None),
        request::SIOCGIWESSID => (HeaderType::Point, Some(limits::IW_ESSID_MAX_SIZE + 1)),
        request::SIOCGIWRATE => (HeaderType::Param, None),
        event::IWEVQUAL => (HeaderType::Qual, None),
        event::IWEVCUSTOM => (HeaderType::Point, Some(limits::IW_CUSTOM_MAX)),
        _ => return None,
    };
    Some(Descriptor { header, max_tokens })
}

/// Remaining values of a multi-value event.
#[derive(Debug, Clone, Copy)]
struct ValueGroup<'a> {
    cmd: u16,
    header: HeaderType,
    values: &'a [u8],
}

/// Lazy, single-pass iterator over the events of a scan buffer.
///
/// Created by [`decode`]. Iteration ends without error exactly at the valid
/// length; the first error is yielded once and ends the stream.
#[derive(Debug, Clone)]
pub struct EventStream<'a> {
    buf: &'a [u8],
    cursor: usize,
    /// Readable bytes: the valid length, clamped to the buffer.
    end: usize,
    /// Valid length as reported by the driver.
    declared_end: usize,
    protocol_version: u8,
    group: Option<ValueGroup<'a>>,
    done: bool,
}

/// Decodes the first `valid_length` bytes of `buffer`.
///
/// `protocol_version` is the interface's `we_version_compiled`. Nothing past
/// `valid_length` is read, whatever lengths the events declare; a
/// `valid_length` larger than the buffer ends in
/// [`ScanError::TruncatedStream`].
///
/// # Example
///
/// ```
/// use iwscan::decode;
///
/// let events: Vec<_> = decode(&[], 0, 22).collect();
/// assert!(events.is_empty());
/// ```
pub fn decode(buffer: &[u8], valid_length: usize, protocol_version: u8) -> EventStream<'_> {
    EventStream {
        buf: buffer,
        cursor: 0,
        end: valid_length.min(buffer.len()),
        declared_end: valid_length,
        protocol_version,
        group: None,
        done: false,
    }
}

impl<'a> Iterator for EventStream<'a> {
    type Item = Result<RawEvent<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Some(group) = self.group.take() {
            return Some(Ok(self.next_value(group)));
        }

        let item = self.next_event();
        match &item {
            Some(Err(_)) | None => self.done = true,
            Some(Ok(_)) => {}
        }
        item
    }
}

impl<'a> EventStream<'a> {
    fn next_event(&mut self) -> Option<Result<RawEvent<'a>>> {
        let buf = self.buf;
        let offset = self.cursor;
        let remaining = self.end - offset;

        if remaining == 0 {
            if self.declared_end > self.end {
                return Some(Err(ScanError::TruncatedStream {
                    offset,
                    declared: self.declared_end - offset,
                    remaining: 0,
                }));
            }
            return None;
        }

        if remaining < layout::IW_EV_LCP_PK_LEN {
            return Some(Err(ScanError::TruncatedStream {
                offset,
                declared: layout::IW_EV_LCP_PK_LEN,
                remaining,
            }));
        }

        let len = usize::from(read_u16(buf, offset));
        let cmd = read_u16(buf, offset + 2);

        if len <= layout::IW_EV_LCP_PK_LEN {
            return Some(Err(ScanError::MalformedEvent { offset, len }));
        }
        if len > remaining {
            return Some(Err(ScanError::TruncatedStream {
                offset,
                declared: len,
                remaining,
            }));
        }

        let body = &buf[offset + layout::IW_EV_LCP_PK_LEN..offset + len];
        self.cursor += len;

        let Some(descr) = descriptor(cmd) else {
            debug!("Skipping unknown scan event {cmd:#06x} ({len} bytes)");
            return Some(Ok(RawEvent::Unknown { cmd }));
        };

        if descr.header == HeaderType::Point {
            return Some(self.decode_point(cmd, descr, body, offset));
        }

        let value_len = descr.header.value_len();
        // 64-bit kernels talking to 32-bit userspace pad fixed payloads.
        let padded = (body.len() % value_len) == layout::COMPAT_PAD
            || (len == 12 && matches!(descr.header, HeaderType::Uint | HeaderType::Qual));
        let values = if padded {
            &body[layout::COMPAT_PAD..]
        } else {
            body
        };

        if values.len() < value_len {
            return Some(Err(ScanError::TruncatedStream {
                offset,
                declared: layout::IW_EV_LCP_PK_LEN + body.len() - values.len() + value_len,
                remaining: len,
            }));
        }

        Some(Ok(self.next_value(ValueGroup {
            cmd,
            header: descr.header,
            values,
        })))
    }

    /// Decodes the first value of `group` and keeps the rest for later.
    fn next_value(&mut self, group: ValueGroup<'a>) -> RawEvent<'a> {
        let value_len = group.header.value_len();
        let (value, rest) = group.values.split_at(value_len);
        let last = rest.len() < value_len;
        if !last {
            self.group = Some(ValueGroup {
                values: rest,
                ..group
            });
        }
        fixed_event(group.cmd, group.header, value, last)
    }

    fn decode_point(
        &self,
        cmd: u16,
        descr: Descriptor,
        body: &'a [u8],
        offset: usize,
    ) -> Result<RawEvent<'a>> {
        // Up to revision 18 the stream still carries the host pointer.
        let inline_pointer = self.protocol_version <= version::LAST_INLINE_POINTER;
        let fixed_len = if inline_pointer {
            layout::IW_EV_POINT_OFF + layout::IW_POINT_FIXED_LEN
        } else {
            layout::IW_POINT_FIXED_LEN
        };

        if body.len() < fixed_len {
            return Err(ScanError::TruncatedStream {
                offset,
                declared: layout::IW_EV_LCP_PK_LEN + fixed_len,
                remaining: layout::IW_EV_LCP_PK_LEN + body.len(),
            });
        }

        let mut fixed = &body[fixed_len - layout::IW_POINT_FIXED_LEN..fixed_len];
        let mut data = &body[fixed_len..];
        let mut length = usize::from(read_u16(fixed, 0));

        let payload = if data.is_empty() {
            None
        } else {
            // 64-bit kernel, 32-bit userspace: 4 extra bytes before and
            // after the fixed part.
            if length != data.len() && data.len() >= layout::COMPAT_PAD {
                let alt_length = usize::from(read_u16(data, 0));
                if alt_length + 2 * layout::COMPAT_PAD == data.len() {
                    let start = fixed_len - layout::IW_POINT_FIXED_LEN + layout::COMPAT_PAD;
                    fixed = &body[start..start + layout::IW_POINT_FIXED_LEN];
                    data = &body[fixed_len + 2 * layout::COMPAT_PAD..];
                    length = alt_length;
                }
            }

            if length > data.len() {
                warn!("Scan event {cmd:#06x} advertises {length} bytes but carries {}", data.len());
                None
            } else if descr.max_tokens.is_some_and(|max| length > max) {
                warn!("Scan event {cmd:#06x} exceeds its maximum size ({length} bytes)");
                None
            } else {
                Some(&data[..length])
            }
        };

        let flags = read_u16(fixed, 2);
        Ok(match cmd {
            request::SIOCGIWESSID => RawEvent::Essid { flags, payload },
            event::IWEVCUSTOM => RawEvent::Custom(payload),
            _ => RawEvent::Unknown { cmd },
        })
    }
}

fn fixed_event<'a>(cmd: u16, header: HeaderType, value: &'a [u8], last: bool) -> RawEvent<'a> {
    match header {
        HeaderType::Addr => {
            let mut mac = [0u8; 6];
            // sa_family precedes sa_data.
            mac.copy_from_slice(&value[2..8]);
            RawEvent::Address(MacAddress(mac))
        }
        HeaderType::Freq => RawEvent::Frequency(read_iw_freq(value)),
        HeaderType::Uint => RawEvent::Mode(read_u32(value, 0)),
        HeaderType::Char => {
            let name = value.split(|b| *b == 0).next().unwrap_or_default();
            RawEvent::Protocol(name)
        }
        HeaderType::Qual => RawEvent::Quality(QualitySample {
            quality: value[0],
            level: value[1],
            noise: value[2],
            updated: QualityFlags::from_bits_retain(value[3]),
        }),
        HeaderType::Param => {
            let param = IwParam {
                value: read_u32(value, 0) as i32,
                fixed: value[4] != 0,
                disabled: value[5] != 0,
                flags: read_u16(value, 6),
            };
            match cmd {
                request::SIOCGIWNWID => RawEvent::NetworkId(param),
                _ => RawEvent::Bitrate { param, last },
            }
        }
        HeaderType::Point => RawEvent::Unknown { cmd },
    }
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_ne_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_ne_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
