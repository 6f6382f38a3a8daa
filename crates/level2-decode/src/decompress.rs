//! LDM segment decompression.
//!
//! After the volume header, an archive record is a sequence of compressed
//! segments: a signed 4-byte big-endian control word giving the size of the
//! bzip2 block that follows, then the block itself. A negative control word
//! marks the final record of the volume; the sign is a historical
//! idiosyncrasy and is stripped, never treated as an error. Each block
//! decompresses independently, and the outputs concatenate into one logical
//! message byte stream.

use std::io::Read;

use bzip2::read::BzDecoder;
use tracing::trace;

use crate::error::{DecodeError, Result};

/// Size of the control word preceding each compressed block.
const CONTROL_WORD_SIZE: usize = 4;

/// Decompress every segment in `data` and concatenate the results.
///
/// `base_offset` is the position of `data` within the original buffer
/// (the volume header size for archive records, 0 for chunk streams) and
/// is only used to report accurate byte offsets in errors.
pub fn decompress_segments(data: &[u8], base_offset: usize) -> Result<Vec<u8>> {
    let mut stream = Vec::new();
    let mut offset = 0usize;
    let mut segment = 0usize;

    while offset < data.len() {
        let remaining = &data[offset..];
        if remaining.len() < CONTROL_WORD_SIZE {
            return Err(DecodeError::MalformedSegment {
                segment,
                offset: base_offset + offset,
                declared: CONTROL_WORD_SIZE,
                remaining: remaining.len(),
            });
        }

        let control = i32::from_be_bytes([remaining[0], remaining[1], remaining[2], remaining[3]]);
        // Negative size marks the volume's last record.
        let declared = control.unsigned_abs() as usize;
        if declared == 0 {
            break;
        }

        let available = remaining.len() - CONTROL_WORD_SIZE;
        if declared > available {
            return Err(DecodeError::MalformedSegment {
                segment,
                offset: base_offset + offset,
                declared,
                remaining: available,
            });
        }

        let block = &remaining[CONTROL_WORD_SIZE..CONTROL_WORD_SIZE + declared];
        let before = stream.len();
        BzDecoder::new(block).read_to_end(&mut stream).map_err(|e| {
            DecodeError::DecompressionFailure {
                segment,
                offset: base_offset + offset,
                reason: e.to_string(),
            }
        })?;

        trace!(
            segment,
            compressed = declared,
            decompressed = stream.len() - before,
            "decompressed segment"
        );

        offset += CONTROL_WORD_SIZE + declared;
        segment += 1;
    }

    Ok(stream)
}
