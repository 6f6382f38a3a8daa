//! Archive II volume header parsing.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::{DecodeError, Result};

/// The 24-byte header that opens every completed Archive II record.
///
/// Reassembled chunk streams do not carry one; see
/// [`crate::decode_chunk_stream`].
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeHeader {
    /// Tape filename, e.g. `AR2V0006.`
    pub tape_marker: String,
    /// Extension number within the day (001-999).
    pub extension: u16,
    /// Time the volume started.
    pub date_time: Option<DateTime<Utc>>,
    /// ICAO site identifier, e.g. `KDMX`.
    pub icao: String,
}

impl VolumeHeader {
    pub const SIZE: usize = 24;

    /// Magic prefix shared by all supported header versions.
    pub const MAGIC: &'static [u8] = b"AR2V";

    /// Whether a buffer starts with an Archive II volume header.
    pub fn is_present(data: &[u8]) -> bool {
        data.len() >= Self::MAGIC.len() && &data[..Self::MAGIC.len()] == Self::MAGIC
    }

    /// Parse the header from the start of an archive record.
    ///
    /// Layout (all integers big-endian):
    /// - Octets 0-8: tape filename, `AR2V00xx.`
    /// - Octets 9-11: extension number, ASCII digits
    /// - Octets 12-15: days since 1970-01-01, 1-based (1970-01-01 = 1)
    /// - Octets 16-19: milliseconds past midnight
    /// - Octets 20-23: ICAO site identifier
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(DecodeError::InvalidHeader {
                reason: format!("need {} bytes, have {}", Self::SIZE, data.len()),
            });
        }
        if !Self::is_present(data) {
            return Err(DecodeError::InvalidHeader {
                reason: "missing AR2V tape marker".to_string(),
            });
        }

        let tape_marker = String::from_utf8_lossy(&data[0..9]).into_owned();
        let extension = std::str::from_utf8(&data[9..12])
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .ok_or_else(|| DecodeError::InvalidHeader {
                reason: "extension number is not numeric".to_string(),
            })?;

        let date = u32::from_be_bytes([data[12], data[13], data[14], data[15]]);
        let milliseconds = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
        let icao = String::from_utf8_lossy(&data[20..24]).trim().to_string();

        Ok(Self {
            tape_marker,
            extension,
            date_time: archive_date_time(date, milliseconds),
            icao,
        })
    }
}

/// Convert the archive's 1-based day count plus milliseconds past midnight
/// to a timestamp. Day 0 means "not set".
pub(crate) fn archive_date_time(date: u32, milliseconds: u32) -> Option<DateTime<Utc>> {
    if date == 0 {
        return None;
    }
    let midnight = Utc.timestamp_opt(i64::from(date - 1) * 86_400, 0).single()?;
    Some(midnight + Duration::milliseconds(i64::from(milliseconds)))
}
