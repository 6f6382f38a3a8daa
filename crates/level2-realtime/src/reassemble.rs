//! Chunk reassembly.
//!
//! Orders the chunks of one volume, concatenates their compressed payloads
//! into a single stream for the no-header decode path, and reports whether
//! the volume is complete (its End chunk was present).

use tracing::debug;

use level2_common::Level2Volume;
use level2_decode::{decode_chunk_stream_with_options, AssemblerOptions, VolumeHeader};

use crate::chunk::{Chunk, ChunkRole};
use crate::error::{ReassemblyError, Result};

/// Reassemble a volume from the chunks received so far.
///
/// Chunks are sorted by their sequence name (lexicographic order is
/// transmission order by construction of the feed), verified to start at
/// sequence 1 with no gaps and to carry at most one End chunk as the
/// final member, and concatenated. The Start chunk's payload begins with
/// the 24-byte volume header, which is stripped so the concatenation is a
/// pure chunk stream.
///
/// Returns the decoded volume and `true` when the End chunk was present.
/// A contiguous set that is still missing its End chunk decodes to a
/// partial volume with `false`; that is the expected state while a
/// volume is being transmitted, not an error.
pub fn reassemble_chunks(chunks: &[Chunk]) -> Result<(Level2Volume, bool)> {
    reassemble_chunks_with_options(chunks, AssemblerOptions::default())
}

/// [`reassemble_chunks`] with explicit assembly options.
pub fn reassemble_chunks_with_options(
    chunks: &[Chunk],
    options: AssemblerOptions,
) -> Result<(Level2Volume, bool)> {
    if chunks.is_empty() {
        return Err(ReassemblyError::IncompleteVolume {
            reason: "no chunks received".to_string(),
        });
    }

    let mut ordered: Vec<&Chunk> = chunks.iter().collect();
    ordered.sort_by(|a, b| a.id().name().cmp(b.id().name()));

    // Validate roles and sequence contiguity before touching any bytes.
    let mut is_complete = false;
    let mut expected = 1u16;
    for chunk in &ordered {
        let sequence = chunk.id().sequence()?;
        let role = chunk.id().role()?;

        if is_complete {
            // The End chunk closes the volume; a chunk sequenced after it
            // (or a second End) makes the set malformed.
            return Err(ReassemblyError::InvalidChunkName(
                chunk.id().name().to_string(),
            ));
        }
        if sequence != expected {
            if expected == 1 {
                // Nothing can be decoded without the Start chunk.
                return Err(ReassemblyError::IncompleteVolume {
                    reason: format!("start chunk missing, first sequence is {sequence}"),
                });
            }
            return Err(ReassemblyError::SequenceGap {
                expected,
                found: sequence,
            });
        }
        if (role == ChunkRole::Start) != (sequence == 1) {
            return Err(ReassemblyError::InvalidChunkName(
                chunk.id().name().to_string(),
            ));
        }
        if role == ChunkRole::End {
            is_complete = true;
        }
        expected += 1;
    }

    let mut stream = Vec::new();
    for chunk in &ordered {
        let mut payload = chunk.payload();
        // The live feed's Start chunk opens with the volume header.
        if VolumeHeader::is_present(payload) {
            payload = &payload[VolumeHeader::SIZE..];
        }
        stream.extend_from_slice(payload);
    }

    debug!(
        chunks = ordered.len(),
        bytes = stream.len(),
        is_complete,
        "reassembled chunk stream"
    );

    let volume = decode_chunk_stream_with_options(&stream, options)?;
    Ok((volume, is_complete))
}
