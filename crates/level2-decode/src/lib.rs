//! NEXRAD Level 2 binary decoder.
//!
//! Decodes Archive II records and reassembled realtime chunk streams into
//! [`Level2Volume`] values: segment decompression, message framing, and
//! radial/sweep assembly. The pipeline is synchronous, single-pass, and
//! CPU-bound; it holds no resources beyond its input buffer, so a caller
//! may abandon a decode by dropping the iterator.

pub mod assembler;
pub mod decompress;
pub mod error;
pub mod header;
pub mod messages;

pub use assembler::{AssemblerOptions, DuplicatePolicy, SweepAssembler};
pub use error::{DecodeError, Result};
pub use header::VolumeHeader;
pub use messages::{MessageIter, RadarMessage};

use level2_common::Level2Volume;
use tracing::debug;

/// Decode a completed archive record (volume header expected).
pub fn decode_record(data: &[u8]) -> Result<Level2Volume> {
    decode_record_with_options(data, AssemblerOptions::default())
}

/// [`decode_record`] with explicit assembly options.
pub fn decode_record_with_options(
    data: &[u8],
    options: AssemblerOptions,
) -> Result<Level2Volume> {
    let header = VolumeHeader::parse(data)?;
    let stream = decompress::decompress_segments(&data[VolumeHeader::SIZE..], VolumeHeader::SIZE)?;
    let mut volume = decode_stream(&stream, options)?;
    volume.site = Some(header.icao);
    Ok(volume)
}

/// Decode a concatenated chunk stream (no volume header).
pub fn decode_chunk_stream(data: &[u8]) -> Result<Level2Volume> {
    decode_chunk_stream_with_options(data, AssemblerOptions::default())
}

/// [`decode_chunk_stream`] with explicit assembly options.
pub fn decode_chunk_stream_with_options(
    data: &[u8],
    options: AssemblerOptions,
) -> Result<Level2Volume> {
    let stream = decompress::decompress_segments(data, 0)?;
    decode_stream(&stream, options)
}

fn decode_stream(stream: &[u8], options: AssemblerOptions) -> Result<Level2Volume> {
    let mut assembler = SweepAssembler::new(options);
    for message in MessageIter::new(stream) {
        assembler.process(&message?)?;
    }
    debug!(
        complete = assembler.is_volume_complete(),
        "assembled volume"
    );
    Ok(assembler.finish())
}
