//! Digital radar data (message type 31) parsing.
//!
//! The message body is a 32-byte radial header followed by a table of
//! 4-byte pointers to self-describing data blocks. Constant blocks
//! (`RVOL`, `RELV`, `RRAD`) carry per-volume/per-radial parameters; moment
//! blocks (`D` type: `DREF`, `DVEL`, ...) carry the scaled gate samples.

use chrono::{DateTime, Utc};
use tracing::trace;

use level2_common::NO_DATA;

use crate::error::{DecodeError, Result};
use crate::header::archive_date_time;
use crate::messages::MessageHeader;

/// Radial header length, pointer table excluded.
const RADIAL_HEADER_SIZE: usize = 32;
/// Fixed part of a moment block before the gate samples.
const MOMENT_BLOCK_HEADER_SIZE: usize = 28;

/// Position of a radial within its elevation cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadialStatus {
    /// First radial of an elevation cut.
    StartOfElevation,
    Intermediate,
    /// Last radial of an elevation cut.
    EndOfElevation,
    /// First radial of the volume scan (also starts a cut).
    StartOfVolume,
    /// Last radial of the volume scan (also ends a cut).
    EndOfVolume,
    Other(u8),
}

impl RadialStatus {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => RadialStatus::StartOfElevation,
            1 => RadialStatus::Intermediate,
            2 => RadialStatus::EndOfElevation,
            3 => RadialStatus::StartOfVolume,
            4 => RadialStatus::EndOfVolume,
            other => RadialStatus::Other(other),
        }
    }

    /// Whether this radial opens a new sweep.
    pub fn starts_sweep(&self) -> bool {
        matches!(
            self,
            RadialStatus::StartOfElevation | RadialStatus::StartOfVolume
        )
    }

    /// Whether this radial closes the current sweep.
    pub fn ends_sweep(&self) -> bool {
        matches!(
            self,
            RadialStatus::EndOfElevation | RadialStatus::EndOfVolume
        )
    }
}

/// The fixed radial header of a digital radar data message.
#[derive(Debug, Clone)]
pub struct RadialHeader {
    pub icao: String,
    /// Milliseconds past midnight of collection.
    pub collect_milliseconds: u32,
    /// 1-based days since 1970-01-01.
    pub collect_date: u16,
    /// 1-based index of this radial within its cut.
    pub azimuth_number: u16,
    /// Azimuth angle in degrees.
    pub azimuth_angle: f32,
    pub compression: u8,
    pub radial_length: u16,
    /// 1 = half-degree spacing, 2 = one-degree spacing.
    pub azimuth_resolution_spacing: u8,
    pub status: RadialStatus,
    pub elevation_number: u8,
    pub cut_sector: u8,
    /// Elevation angle in degrees.
    pub elevation_angle: f32,
    pub spot_blanking: u8,
    pub azimuth_indexing_mode: u8,
    pub data_block_count: u16,
}

impl RadialHeader {
    /// Azimuth step in degrees implied by the resolution spacing.
    pub fn azimuth_step(&self) -> f32 {
        if self.azimuth_resolution_spacing == 1 {
            0.5
        } else {
            1.0
        }
    }

    /// Collection timestamp of this radial.
    pub fn date_time(&self) -> Option<DateTime<Utc>> {
        archive_date_time(u32::from(self.collect_date), self.collect_milliseconds)
    }
}

/// Volume data block (`RVOL`): site position and coverage pattern.
#[derive(Debug, Clone)]
pub struct VolumeBlock {
    pub latitude: f32,
    pub longitude: f32,
    pub coverage_pattern: u16,
}

/// Radial data block (`RRAD`): per-radial parameters.
#[derive(Debug, Clone)]
pub struct RadialBlock {
    /// Unambiguous range, km.
    pub unambiguous_range: f32,
    /// Nyquist velocity, m/s.
    pub nyquist_velocity: f32,
}

/// A generic data moment block (`D` type).
#[derive(Debug, Clone)]
pub struct MomentBlock {
    /// Transmitted three-character moment name.
    pub name: String,
    pub gate_count: u16,
    /// Range to the first gate, thousandths of km.
    pub first_gate: u16,
    /// Gate spacing, thousandths of km.
    pub gate_interval: u16,
    pub snr_threshold: i16,
    pub control_flags: u8,
    /// Bits per raw sample: 8 or 16.
    pub word_size: u8,
    pub scale: f32,
    pub offset: f32,
    /// Raw sample bytes, `gate_count * word_size / 8` long.
    pub data: Vec<u8>,
}

impl MomentBlock {
    /// Range to the first gate in km.
    pub fn first_gate_km(&self) -> f32 {
        f32::from(self.first_gate) / 1000.0
    }

    /// Gate spacing in km.
    pub fn gate_interval_km(&self) -> f32 {
        f32::from(self.gate_interval) / 1000.0
    }

    /// Decode the raw samples to physical values.
    ///
    /// Raw 0 is below threshold and raw 1 is range-folded; both map to
    /// [`NO_DATA`], never to 0.0. Everything else decodes as
    /// `(raw - offset) / scale`; a zero scale marks unscaled data.
    pub fn decoded_values(&self) -> Vec<f32> {
        let gates = usize::from(self.gate_count);
        let mut values = Vec::with_capacity(gates);
        for gate in 0..gates {
            let raw = match self.word_size {
                16 => {
                    let i = gate * 2;
                    if i + 1 >= self.data.len() {
                        break;
                    }
                    u16::from_be_bytes([self.data[i], self.data[i + 1]])
                }
                _ => {
                    if gate >= self.data.len() {
                        break;
                    }
                    u16::from(self.data[gate])
                }
            };
            values.push(decode_raw(raw, self.scale, self.offset));
        }
        values
    }
}

fn decode_raw(raw: u16, scale: f32, offset: f32) -> f32 {
    if scale == 0.0 {
        return f32::from(raw);
    }
    match raw {
        0 | 1 => NO_DATA,
        _ => (f32::from(raw) - offset) / scale,
    }
}

/// A fully parsed digital radar data message.
#[derive(Debug, Clone)]
pub struct DigitalRadarData {
    pub message_header: MessageHeader,
    pub radial: RadialHeader,
    pub volume_block: Option<VolumeBlock>,
    pub radial_block: Option<RadialBlock>,
    pub moments: Vec<MomentBlock>,
}

pub(crate) fn parse(
    message_header: MessageHeader,
    body: &[u8],
    message: usize,
    offset: usize,
) -> Result<DigitalRadarData> {
    let truncated = || DecodeError::TruncatedMessage { message, offset };

    if body.len() < RADIAL_HEADER_SIZE {
        return Err(truncated());
    }

    // Radial header layout (big-endian, offsets within the body):
    // - Octets 0-3: ICAO
    // - Octets 4-7: collection milliseconds past midnight
    // - Octets 8-9: collection Julian date
    // - Octets 10-11: azimuth number
    // - Octets 12-15: azimuth angle (IEEE f32)
    // - Octet 16: compression indicator, octet 17: spare
    // - Octets 18-19: radial length
    // - Octet 20: azimuth resolution spacing
    // - Octet 21: radial status
    // - Octet 22: elevation number, octet 23: cut sector
    // - Octets 24-27: elevation angle (IEEE f32)
    // - Octet 28: spot blanking, octet 29: azimuth indexing mode
    // - Octets 30-31: data block count
    let radial = RadialHeader {
        icao: String::from_utf8_lossy(&body[0..4]).trim().to_string(),
        collect_milliseconds: u32::from_be_bytes([body[4], body[5], body[6], body[7]]),
        collect_date: u16::from_be_bytes([body[8], body[9]]),
        azimuth_number: u16::from_be_bytes([body[10], body[11]]),
        azimuth_angle: f32::from_be_bytes([body[12], body[13], body[14], body[15]]),
        compression: body[16],
        radial_length: u16::from_be_bytes([body[18], body[19]]),
        azimuth_resolution_spacing: body[20],
        status: RadialStatus::from_raw(body[21]),
        elevation_number: body[22],
        cut_sector: body[23],
        elevation_angle: f32::from_be_bytes([body[24], body[25], body[26], body[27]]),
        spot_blanking: body[28],
        azimuth_indexing_mode: body[29],
        data_block_count: u16::from_be_bytes([body[30], body[31]]),
    };

    let block_count = usize::from(radial.data_block_count);
    let pointer_end = RADIAL_HEADER_SIZE + block_count * 4;
    if body.len() < pointer_end {
        return Err(truncated());
    }

    let mut message_out = DigitalRadarData {
        message_header,
        radial,
        volume_block: None,
        radial_block: None,
        moments: Vec::new(),
    };

    for i in 0..block_count {
        let p = RADIAL_HEADER_SIZE + i * 4;
        let pointer =
            u32::from_be_bytes([body[p], body[p + 1], body[p + 2], body[p + 3]]) as usize;
        if pointer == 0 {
            continue;
        }
        if pointer + 4 > body.len() {
            return Err(truncated());
        }

        let tag = &body[pointer..pointer + 4];
        match tag[0] {
            b'D' => {
                let name = String::from_utf8_lossy(&tag[1..4]).into_owned();
                message_out
                    .moments
                    .push(parse_moment_block(name, &body[pointer..], &truncated)?);
            }
            b'R' => match &tag[1..4] {
                b"VOL" => message_out.volume_block = parse_volume_block(&body[pointer..]),
                b"RAD" => message_out.radial_block = parse_radial_block(&body[pointer..]),
                // RELV and anything else constant: nothing the assembler needs.
                _ => trace!(tag = %String::from_utf8_lossy(tag), "skipping constant block"),
            },
            _ => trace!(tag = %String::from_utf8_lossy(tag), "skipping unrecognized block"),
        }
    }

    Ok(message_out)
}

/// Moment block layout after the 4-byte tag:
/// - Octets 4-7: reserved
/// - Octets 8-9: number of gates
/// - Octets 10-11: range to first gate (thousandths of km)
/// - Octets 12-13: gate spacing (thousandths of km)
/// - Octets 14-15: TOVER
/// - Octets 16-17: SNR threshold (signed)
/// - Octet 18: control flags
/// - Octet 19: data word size (bits)
/// - Octets 20-23: scale (IEEE f32)
/// - Octets 24-27: offset (IEEE f32)
/// - Octets 28+: raw samples
fn parse_moment_block(
    name: String,
    block: &[u8],
    truncated: &impl Fn() -> DecodeError,
) -> Result<MomentBlock> {
    if block.len() < MOMENT_BLOCK_HEADER_SIZE {
        return Err(truncated());
    }

    let gate_count = u16::from_be_bytes([block[8], block[9]]);
    let word_size = block[19];
    let sample_bytes = usize::from(gate_count) * usize::from(word_size.max(8)) / 8;
    let data_end = MOMENT_BLOCK_HEADER_SIZE + sample_bytes;
    if block.len() < data_end {
        return Err(truncated());
    }

    Ok(MomentBlock {
        name,
        gate_count,
        first_gate: u16::from_be_bytes([block[10], block[11]]),
        gate_interval: u16::from_be_bytes([block[12], block[13]]),
        snr_threshold: i16::from_be_bytes([block[16], block[17]]),
        control_flags: block[18],
        word_size,
        scale: f32::from_be_bytes([block[20], block[21], block[22], block[23]]),
        offset: f32::from_be_bytes([block[24], block[25], block[26], block[27]]),
        data: block[MOMENT_BLOCK_HEADER_SIZE..data_end].to_vec(),
    })
}

/// Volume block: latitude/longitude at octets 8-15, VCP at octets 40-41.
fn parse_volume_block(block: &[u8]) -> Option<VolumeBlock> {
    if block.len() < 44 {
        return None;
    }
    Some(VolumeBlock {
        latitude: f32::from_be_bytes([block[8], block[9], block[10], block[11]]),
        longitude: f32::from_be_bytes([block[12], block[13], block[14], block[15]]),
        coverage_pattern: u16::from_be_bytes([block[40], block[41]]),
    })
}

/// Radial block: unambiguous range (tenths of km) at octets 6-7, nyquist
/// velocity (hundredths of m/s) at octets 16-17.
fn parse_radial_block(block: &[u8]) -> Option<RadialBlock> {
    if block.len() < 20 {
        return None;
    }
    Some(RadialBlock {
        unambiguous_range: f32::from(u16::from_be_bytes([block[6], block[7]])) / 10.0,
        nyquist_velocity: f32::from(u16::from_be_bytes([block[16], block[17]])) / 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_raw_values_map_to_sentinel() {
        let block = MomentBlock {
            name: "REF".to_string(),
            gate_count: 4,
            first_gate: 2125,
            gate_interval: 250,
            snr_threshold: 16,
            control_flags: 0,
            word_size: 8,
            scale: 2.0,
            offset: 66.0,
            data: vec![0, 1, 66, 100],
        };
        let values = block.decoded_values();
        assert_eq!(values[0], NO_DATA);
        assert_eq!(values[1], NO_DATA);
        assert!((values[2] - 0.0).abs() < 1e-6);
        assert!((values[3] - 17.0).abs() < 1e-6);
    }

    #[test]
    fn sixteen_bit_words_decode_big_endian() {
        let block = MomentBlock {
            name: "PHI".to_string(),
            gate_count: 2,
            first_gate: 0,
            gate_interval: 250,
            snr_threshold: 0,
            control_flags: 0,
            word_size: 16,
            scale: 1.0,
            offset: 0.0,
            data: vec![0x01, 0x00, 0x00, 0x02],
        };
        let values = block.decoded_values();
        assert_eq!(values, vec![256.0, 2.0]);
    }

    #[test]
    fn zero_scale_passes_raw_through() {
        assert_eq!(decode_raw(0, 0.0, 5.0), 0.0);
        assert_eq!(decode_raw(7, 0.0, 5.0), 7.0);
    }

    #[test]
    fn geometry_conversions() {
        let block = MomentBlock {
            name: "REF".to_string(),
            gate_count: 0,
            first_gate: 2125,
            gate_interval: 250,
            snr_threshold: 0,
            control_flags: 0,
            word_size: 8,
            scale: 1.0,
            offset: 0.0,
            data: Vec::new(),
        };
        assert!((block.first_gate_km() - 2.125).abs() < 1e-6);
        assert!((block.gate_interval_km() - 0.25).abs() < 1e-6);
    }
}
