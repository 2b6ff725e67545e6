//! Folding scan events into access point records.

use log::{debug, warn};
use std::borrow::Cow;

use crate::Result;
use crate::api::models::{
    AccessPointRecord, CapabilityRange, EssidValue, Frequency, IwFreq, NetworkId, OperatingMode,
};
use crate::core::decode::RawEvent;
use crate::core::quality::interpret;
use crate::types::constants::essid_flags;

/// Incremental record builder.
///
/// Every address event opens a new record; the events after it, up to the
/// next address, fill that record in. Records already closed are never
/// touched again.
#[derive(Debug)]
pub struct RecordAssembler<'r> {
    range: Option<&'r CapabilityRange>,
    ap_count: u32,
    records: Vec<AccessPointRecord>,
}

impl<'r> RecordAssembler<'r> {
    /// Creates an assembler. Without a range, frequencies resolve no channel
    /// and signal readings are unavailable.
    pub fn new(range: Option<&'r CapabilityRange>) -> Self {
        Self {
            range,
            ap_count: 0,
            records: Vec::new(),
        }
    }

    /// Applies one event.
    pub fn push(&mut self, event: RawEvent<'_>) {
        if let RawEvent::Address(address) = event {
            self.ap_count += 1;
            self.records.push(AccessPointRecord::new(self.ap_count, address));
            return;
        }

        let range = self.range;
        let Some(current) = self.records.last_mut() else {
            debug!("Ignoring {event:?} before the first access point");
            return;
        };

        match event {
            RawEvent::Address(_) => {}
            RawEvent::Frequency(freq) => current.frequency = resolve_frequency(freq, range),
            RawEvent::Mode(code) => current.mode = Some(OperatingMode::from(code)),
            RawEvent::Essid { flags, payload } => current.essid = Some(essid(flags, payload)),
            RawEvent::Quality(sample) => current.signal = interpret(sample, range),
            RawEvent::Protocol(name) => current.protocol = Some(text(name).into_owned()),
            RawEvent::NetworkId(param) => {
                current.network_id = Some(if param.disabled {
                    NetworkId::OffAny
                } else {
                    NetworkId::Value { id: param.value }
                });
            }
            RawEvent::Bitrate { param, .. } => match u64::try_from(param.value) {
                Ok(rate) => current.bitrates.push(rate),
                Err(_) => warn!("Ignoring negative bit rate {}", param.value),
            },
            RawEvent::Custom(Some(bytes)) => current.extra.push(text(bytes).into_owned()),
            RawEvent::Custom(None) | RawEvent::Unknown { .. } => {}
        }
    }

    /// Number of access points seen so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no access point has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the records in stream order.
    pub fn finish(self) -> Vec<AccessPointRecord> {
        self.records
    }
}

/// Assembles every record of an event stream.
///
/// The first decoding error aborts assembly; records built before it are
/// discarded with it.
///
/// # Example
///
/// ```
/// use iwscan::{assemble, decode};
///
/// let records = assemble(decode(&[], 0, 22), None)?;
/// assert!(records.is_empty());
/// # Ok::<(), iwscan::ScanError>(())
/// ```
pub fn assemble<'a, I>(events: I, range: Option<&CapabilityRange>) -> Result<Vec<AccessPointRecord>>
where
    I: IntoIterator<Item = Result<RawEvent<'a>>>,
{
    let mut assembler = RecordAssembler::new(range);
    for event in events {
        assembler.push(event?);
    }
    debug!("Assembled {} access point records", assembler.len());
    Ok(assembler.finish())
}

fn resolve_frequency(freq: IwFreq, range: Option<&CapabilityRange>) -> Option<Frequency> {
    let value = freq.as_f64();
    if freq.is_channel() {
        // Some drivers report the channel number instead of a frequency.
        let channel = value as u32;
        let hz = range.and_then(|r| r.frequency_for(channel));
        if hz.is_none() {
            debug!("Channel {channel} has no frequency in the range table");
        }
        return hz.map(|hz| Frequency {
            hz,
            channel: Some(channel),
        });
    }

    Some(Frequency {
        hz: value,
        channel: range.and_then(|r| r.channel_for(value)),
    })
}

fn essid(flags: u16, payload: Option<&[u8]>) -> EssidValue {
    if flags == 0 {
        return EssidValue::OffAnyHidden;
    }
    let index = flags & essid_flags::IW_ENCODE_INDEX;
    EssidValue::Named {
        name: payload.map(text).unwrap_or_default().into_owned(),
        index: (index > 1).then_some(index),
    }
}

/// Decodes driver text, stopping at the first NUL.
fn text(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.split(|b| *b == 0).next().unwrap_or_default();
    let decoded = String::from_utf8_lossy(bytes);
    if let Cow::Owned(_) = decoded {
        warn!("Invalid UTF-8 in scan text, replaced invalid sequences");
    }
    decoded
}
