//! Realtime chunk reassembly for NEXRAD Level 2 volumes.
//!
//! The live feed transmits each volume as an ordered series of chunks
//! (Start, Intermediate..., End). This crate orders and concatenates them
//! for the decoder's no-header path, and provides [`VolumeStore`], a cache
//! that rebuilds volumes incrementally as chunks arrive.
//!
//! A volume reassembled from its complete chunk set is equivalent, value
//! for value, to decoding the corresponding completed archive record.

pub mod chunk;
pub mod error;
pub mod reassemble;
pub mod store;

pub use chunk::{Chunk, ChunkIdentifier, ChunkRole};
pub use error::{ReassemblyError, Result};
pub use reassemble::{reassemble_chunks, reassemble_chunks_with_options};
pub use store::{StoredVolume, VolumeStore};
