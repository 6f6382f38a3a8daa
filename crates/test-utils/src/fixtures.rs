//! Synthetic Archive II byte stream builders.
//!
//! The layouts here mirror the wire format the decoder implements: 24-byte
//! volume header, bzip2 LDM segments with signed control words, 12-byte CTM
//! framing, 16-byte message headers, and digital radar data (type 31)
//! bodies with pointer-addressed data blocks.

use std::io::Write;

use bzip2::write::BzEncoder;
use bzip2::Compression;

use crate::generators::raw_samples;

/// Site used by all fixtures.
pub const TEST_SITE: &str = "KDMX";
/// 1-based days since 1970-01-01 (2024-03-09).
pub const TEST_DATE: u16 = 19_791;
/// Milliseconds past midnight of the first radial (12:00:00).
pub const TEST_BASE_MS: u32 = 43_200_000;
/// Coverage pattern reported by the fixture volume blocks.
pub const TEST_VCP: u16 = 212;
/// Nyquist velocity reported by the fixture radial blocks, in m/s.
pub const TEST_NYQUIST: f32 = 28.0;

/// One moment's encoding parameters.
#[derive(Debug, Clone)]
pub struct MomentFixture {
    pub name: &'static str,
    pub scale: f32,
    pub offset: f32,
    /// Range to first gate, thousandths of km.
    pub first_gate: u16,
    /// Gate spacing, thousandths of km.
    pub gate_interval: u16,
}

impl MomentFixture {
    pub fn reflectivity() -> Self {
        Self {
            name: "REF",
            scale: 2.0,
            offset: 66.0,
            first_gate: 2125,
            gate_interval: 250,
        }
    }

    pub fn velocity() -> Self {
        Self {
            name: "VEL",
            scale: 2.0,
            offset: 129.0,
            first_gate: 2125,
            gate_interval: 250,
        }
    }

    /// A moment with an arbitrary (possibly unrecognized) name.
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            scale: 1.0,
            offset: 0.0,
            first_gate: 0,
            gate_interval: 250,
        }
    }
}

/// One elevation cut of the fixture volume.
#[derive(Debug, Clone)]
pub struct SweepFixture {
    pub elevation_angle: f32,
    /// Radials per sweep; must be at least 2 so the start and end markers
    /// land on different radials.
    pub radial_count: u16,
    pub gate_count: u16,
    pub moments: Vec<MomentFixture>,
}

impl SweepFixture {
    pub fn new(
        elevation_angle: f32,
        radial_count: u16,
        gate_count: u16,
        moments: Vec<MomentFixture>,
    ) -> Self {
        assert!(radial_count >= 2, "sweep needs distinct start/end radials");
        Self {
            elevation_angle,
            radial_count,
            gate_count,
            moments,
        }
    }
}

/// A complete synthetic volume.
#[derive(Debug, Clone)]
pub struct VolumeFixture {
    pub site: &'static str,
    pub vcp: u16,
    pub sweeps: Vec<SweepFixture>,
}

/// A realtime chunk produced from a [`VolumeFixture`].
#[derive(Debug, Clone)]
pub struct ChunkFixture {
    /// Sequence name, e.g. `20240309-120000-001-S`.
    pub name: String,
    pub payload: Vec<u8>,
}

impl VolumeFixture {
    pub fn new(sweeps: Vec<SweepFixture>) -> Self {
        Self {
            site: TEST_SITE,
            vcp: TEST_VCP,
            sweeps,
        }
    }

    /// A volume with reflectivity and velocity on every sweep and the
    /// given elevation sequence (transmission order, deliberately not
    /// sorted by the caller).
    pub fn two_moment(elevations: &[f32], radials: u16, gates: u16) -> Self {
        Self::new(
            elevations
                .iter()
                .map(|&elevation| {
                    SweepFixture::new(
                        elevation,
                        radials,
                        gates,
                        vec![MomentFixture::reflectivity(), MomentFixture::velocity()],
                    )
                })
                .collect(),
        )
    }

    /// The encoded messages of one sweep, concatenated.
    pub fn sweep_stream(&self, sweep_index: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let sweep = &self.sweeps[sweep_index];
        let global_base: usize = self.sweeps[..sweep_index]
            .iter()
            .map(|s| usize::from(s.radial_count))
            .sum();
        for radial in 0..usize::from(sweep.radial_count) {
            let status = self.radial_status(sweep_index, radial);
            out.extend(self.encode_radial(sweep_index, radial, global_base + radial, status));
        }
        out
    }

    /// All messages of the volume, concatenated in transmission order.
    pub fn message_stream(&self) -> Vec<u8> {
        (0..self.sweeps.len())
            .flat_map(|i| self.sweep_stream(i))
            .collect()
    }

    /// A completed archive record: volume header plus one LDM segment per
    /// sweep, the last segment carrying the historical negative control
    /// word.
    pub fn archive_bytes(&self) -> Vec<u8> {
        let mut out = self.volume_header();
        let last = self.sweeps.len() - 1;
        for i in 0..self.sweeps.len() {
            out.extend(ldm_record(&self.sweep_stream(i), i == last));
        }
        out
    }

    /// An archive record whose segments are cut at the given byte offsets
    /// of the message stream, so segment boundaries can land inside a
    /// message body.
    pub fn archive_bytes_split(&self, cuts: &[usize]) -> Vec<u8> {
        let stream = self.message_stream();
        let mut out = self.volume_header();
        let mut start = 0usize;
        let mut slices = Vec::new();
        for &cut in cuts {
            assert!(cut > start && cut < stream.len(), "cut out of range");
            slices.push(&stream[start..cut]);
            start = cut;
        }
        slices.push(&stream[start..]);
        let last = slices.len() - 1;
        for (i, slice) in slices.iter().enumerate() {
            out.extend(ldm_record(slice, i == last));
        }
        out
    }

    /// Realtime chunks covering the whole volume, one sweep per chunk.
    /// The Start chunk carries the volume header, as on the live feed.
    pub fn chunks(&self) -> Vec<ChunkFixture> {
        let last = self.sweeps.len() - 1;
        (0..self.sweeps.len())
            .map(|i| {
                let role = if i == 0 {
                    'S'
                } else if i == last {
                    'E'
                } else {
                    'I'
                };
                let mut payload = Vec::new();
                if i == 0 {
                    payload.extend(self.volume_header());
                }
                payload.extend(ldm_record(&self.sweep_stream(i), i == last));
                ChunkFixture {
                    name: format!("20240309-120000-{:03}-{}", i + 1, role),
                    payload,
                }
            })
            .collect()
    }

    /// The 24-byte Archive II volume header.
    pub fn volume_header(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(24);
        out.extend_from_slice(b"AR2V0006.");
        out.extend_from_slice(b"001");
        out.extend_from_slice(&u32::from(TEST_DATE).to_be_bytes());
        out.extend_from_slice(&TEST_BASE_MS.to_be_bytes());
        out.extend_from_slice(self.site.as_bytes());
        out
    }

    fn radial_status(&self, sweep_index: usize, radial: usize) -> u8 {
        let sweep = &self.sweeps[sweep_index];
        let last_sweep = sweep_index == self.sweeps.len() - 1;
        if radial == 0 {
            if sweep_index == 0 {
                3 // start of volume
            } else {
                0 // start of elevation
            }
        } else if radial == usize::from(sweep.radial_count) - 1 {
            if last_sweep {
                4 // end of volume
            } else {
                2 // end of elevation
            }
        } else {
            1
        }
    }

    fn encode_radial(
        &self,
        sweep_index: usize,
        radial: usize,
        global_index: usize,
        status: u8,
    ) -> Vec<u8> {
        let sweep = &self.sweeps[sweep_index];
        let azimuth_number = (radial + 1) as u16;
        let milliseconds = TEST_BASE_MS + (global_index as u32) * 50;

        // Data blocks: RVOL + RRAD + one per moment.
        let block_count = (2 + sweep.moments.len()) as u16;
        let pointer_table_len = usize::from(block_count) * 4;

        let mut blocks: Vec<Vec<u8>> = Vec::new();
        blocks.push(encode_volume_block(self.vcp));
        blocks.push(encode_radial_block());
        for moment in &sweep.moments {
            blocks.push(encode_moment_block(
                moment,
                azimuth_number,
                usize::from(sweep.gate_count),
            ));
        }

        let mut pointers = Vec::with_capacity(pointer_table_len);
        let mut next = 32 + pointer_table_len;
        for block in &blocks {
            pointers.extend_from_slice(&(next as u32).to_be_bytes());
            next += block.len();
        }

        let body_len = next;
        let mut body = Vec::with_capacity(body_len);
        // Radial header.
        body.extend_from_slice(self.site.as_bytes()); // octets 0-3
        body.extend_from_slice(&milliseconds.to_be_bytes());
        body.extend_from_slice(&TEST_DATE.to_be_bytes());
        body.extend_from_slice(&azimuth_number.to_be_bytes());
        body.extend_from_slice(&(radial as f32).to_be_bytes()); // azimuth angle
        body.push(0); // compression
        body.push(0); // spare
        body.extend_from_slice(&(body_len as u16).to_be_bytes()); // radial length
        body.push(2); // resolution spacing: 1.0 degree
        body.push(status);
        body.push((sweep_index + 1) as u8); // elevation number
        body.push(0); // cut sector
        body.extend_from_slice(&sweep.elevation_angle.to_be_bytes());
        body.push(0); // spot blanking
        body.push(0); // indexing mode
        body.extend_from_slice(&block_count.to_be_bytes());
        body.extend_from_slice(&pointers);
        for block in &blocks {
            body.extend_from_slice(block);
        }
        if body.len() % 2 != 0 {
            body.push(0);
        }

        // CTM framing + message header.
        let size = ((16 + body.len()) / 2) as u16;
        let mut out = vec![0u8; 12];
        out.extend_from_slice(&size.to_be_bytes());
        out.push(0); // RDA channel
        out.push(31); // digital radar data
        out.extend_from_slice(&(global_index as u16).to_be_bytes());
        out.extend_from_slice(&TEST_DATE.to_be_bytes());
        out.extend_from_slice(&milliseconds.to_be_bytes());
        out.extend_from_slice(&1u16.to_be_bytes()); // segment count
        out.extend_from_slice(&1u16.to_be_bytes()); // segment number
        out.extend_from_slice(&body);
        out
    }
}

/// Volume data block: 44 bytes, VCP at octets 40-41.
fn encode_volume_block(vcp: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(44);
    out.extend_from_slice(b"RVOL");
    out.extend_from_slice(&44u16.to_be_bytes()); // block length
    out.push(1); // version major
    out.push(0); // version minor
    out.extend_from_slice(&41.73f32.to_be_bytes()); // latitude
    out.extend_from_slice(&(-93.72f32).to_be_bytes()); // longitude
    out.extend_from_slice(&300i16.to_be_bytes()); // site height
    out.extend_from_slice(&10u16.to_be_bytes()); // feedhorn height
    out.extend_from_slice(&0f32.to_be_bytes()); // calibration
    out.extend_from_slice(&0f32.to_be_bytes()); // horizontal tx power
    out.extend_from_slice(&0f32.to_be_bytes()); // vertical tx power
    out.extend_from_slice(&0f32.to_be_bytes()); // differential reflectivity
    out.extend_from_slice(&0f32.to_be_bytes()); // initial phase
    out.extend_from_slice(&vcp.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // processing status
    out
}

/// Radial data block: 20 bytes, nyquist at octets 16-17 (hundredths m/s).
fn encode_radial_block() -> Vec<u8> {
    let mut out = Vec::with_capacity(20);
    out.extend_from_slice(b"RRAD");
    out.extend_from_slice(&20u16.to_be_bytes());
    out.extend_from_slice(&4660u16.to_be_bytes()); // unambiguous range, tenths km
    out.extend_from_slice(&(-80.0f32).to_be_bytes()); // horizontal noise
    out.extend_from_slice(&(-80.0f32).to_be_bytes()); // vertical noise
    out.extend_from_slice(&((TEST_NYQUIST * 100.0) as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // spare
    out
}

/// Generic data moment block with 8-bit words.
fn encode_moment_block(moment: &MomentFixture, azimuth_number: u16, gates: usize) -> Vec<u8> {
    let mut name = moment.name.as_bytes().to_vec();
    name.resize(3, b' ');

    let mut out = Vec::with_capacity(28 + gates);
    out.push(b'D');
    out.extend_from_slice(&name);
    out.extend_from_slice(&0u32.to_be_bytes()); // reserved
    out.extend_from_slice(&(gates as u16).to_be_bytes());
    out.extend_from_slice(&moment.first_gate.to_be_bytes());
    out.extend_from_slice(&moment.gate_interval.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // tover
    out.extend_from_slice(&16i16.to_be_bytes()); // snr threshold
    out.push(0); // control flags
    out.push(8); // word size
    out.extend_from_slice(&moment.scale.to_be_bytes());
    out.extend_from_slice(&moment.offset.to_be_bytes());
    out.extend(raw_samples(azimuth_number, gates));
    out
}

/// One LDM record: signed big-endian control word plus a bzip2 block.
/// The final record of a volume carries a negative control word.
pub fn ldm_record(payload: &[u8], last: bool) -> Vec<u8> {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload).expect("bzip2 write");
    let block = encoder.finish().expect("bzip2 finish");

    let mut control = block.len() as i32;
    if last {
        control = -control;
    }
    let mut out = control.to_be_bytes().to_vec();
    out.extend_from_slice(&block);
    out
}
