//! Message framing.
//!
//! The decompressed stream is a sequence of framed messages: 12 bytes of
//! legacy CTM transmission framing (ignored), a 16-byte message header,
//! then a body whose length comes from the header's size field. The size
//! field is the single source of truth for every message type; the
//! documented fixed-size defaults for legacy types are never assumed.
//!
//! Only the digital radar data type (31) is decoded; everything else is
//! skipped by size. Framing does not assume the bzip2 block boundaries of
//! the segment layer line up with message boundaries, because the segment
//! layer already concatenates blocks into one contiguous stream.

pub mod digital_radar;

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::error::{DecodeError, Result};
use crate::header::archive_date_time;

pub use digital_radar::{DigitalRadarData, MomentBlock, RadialHeader, RadialStatus};

/// Legacy CTM framing preceding every message header.
const CTM_SIZE: usize = 12;
/// Fixed message header size.
const HEADER_SIZE: usize = 16;
/// Message type carrying digital radar data.
pub const DIGITAL_RADAR_DATA_TYPE: u8 = 31;

/// The 16-byte header framing every message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageHeader {
    /// Message size in 16-bit halfwords, header included, CTM excluded.
    pub size: u16,
    pub rda_channel: u8,
    pub message_type: u8,
    pub sequence_number: u16,
    /// 1-based days since 1970-01-01.
    pub julian_date: u16,
    /// Milliseconds past midnight.
    pub milliseconds: u32,
    pub segment_count: u16,
    pub segment_number: u16,
}

impl MessageHeader {
    /// Layout (big-endian):
    /// - Octets 0-1: size in halfwords
    /// - Octet 2: RDA redundant channel
    /// - Octet 3: message type
    /// - Octets 4-5: id sequence number
    /// - Octets 6-7: Julian date
    /// - Octets 8-11: milliseconds past midnight
    /// - Octets 12-13: number of segments
    /// - Octets 14-15: segment number
    fn parse(data: &[u8]) -> Self {
        Self {
            size: u16::from_be_bytes([data[0], data[1]]),
            rda_channel: data[2],
            message_type: data[3],
            sequence_number: u16::from_be_bytes([data[4], data[5]]),
            julian_date: u16::from_be_bytes([data[6], data[7]]),
            milliseconds: u32::from_be_bytes([data[8], data[9], data[10], data[11]]),
            segment_count: u16::from_be_bytes([data[12], data[13]]),
            segment_number: u16::from_be_bytes([data[14], data[15]]),
        }
    }

    /// Timestamp from the header's Julian date and milliseconds.
    pub fn date_time(&self) -> Option<DateTime<Utc>> {
        archive_date_time(u32::from(self.julian_date), self.milliseconds)
    }

    /// Total message length in bytes, header included.
    pub fn message_len(&self) -> usize {
        usize::from(self.size) * 2
    }
}

/// A framed radar message.
#[derive(Debug, Clone)]
pub enum RadarMessage {
    DigitalRadarData(Box<DigitalRadarData>),
    /// Any type other than 31: header retained, body skipped.
    Other { header: MessageHeader },
}

impl RadarMessage {
    pub fn header(&self) -> &MessageHeader {
        match self {
            RadarMessage::DigitalRadarData(m) => &m.message_header,
            RadarMessage::Other { header } => header,
        }
    }
}

/// Lazy, forward-only iterator over the messages of a decompressed stream.
///
/// Single pass, finite, terminating at stream exhaustion or the first
/// framing error. Messages yielded before an error remain valid; after an
/// error the iterator is fused.
pub struct MessageIter<'a> {
    data: &'a [u8],
    offset: usize,
    index: usize,
    done: bool,
}

impl<'a> MessageIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            index: 0,
            done: false,
        }
    }

    fn truncated(&mut self) -> Option<Result<RadarMessage>> {
        self.done = true;
        Some(Err(DecodeError::TruncatedMessage {
            message: self.index,
            offset: self.offset,
        }))
    }

    /// Trailing zero bytes are padding, not a truncated message.
    fn is_padding(&self) -> bool {
        self.data[self.offset..].iter().all(|b| *b == 0)
    }
}

impl<'a> Iterator for MessageIter<'a> {
    type Item = Result<RadarMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.data.len() {
            return None;
        }

        let remaining = self.data.len() - self.offset;
        if remaining < CTM_SIZE + HEADER_SIZE {
            if self.is_padding() {
                return None;
            }
            return self.truncated();
        }

        let header_start = self.offset + CTM_SIZE;
        let header = MessageHeader::parse(&self.data[header_start..header_start + HEADER_SIZE]);

        if header.size == 0 {
            if self.is_padding() {
                return None;
            }
            return self.truncated();
        }
        // The size field covers the header itself (8 halfwords minimum).
        if header.message_len() < HEADER_SIZE {
            return self.truncated();
        }
        if remaining < CTM_SIZE + header.message_len() {
            return self.truncated();
        }

        let body_start = header_start + HEADER_SIZE;
        let body_end = header_start + header.message_len();
        let body = &self.data[body_start..body_end];

        trace!(
            index = self.index,
            message_type = header.message_type,
            size = header.size,
            "framed message"
        );

        let message = if header.message_type == DIGITAL_RADAR_DATA_TYPE {
            match digital_radar::parse(header, body, self.index, body_start) {
                Ok(m) => RadarMessage::DigitalRadarData(Box::new(m)),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        } else {
            RadarMessage::Other { header }
        };

        self.offset += CTM_SIZE + message.header().message_len();
        self.index += 1;
        Some(Ok(message))
    }
}
