//! Error types for chunk reassembly.

use thiserror::Error;

use level2_decode::DecodeError;

/// Errors raised while reassembling a volume from realtime chunks.
#[derive(Debug, Error)]
pub enum ReassemblyError {
    /// The chunk set cannot be decoded at all (empty, or no Start chunk).
    /// Expected while a volume is still being transmitted; retry once more
    /// chunks have arrived.
    #[error("volume transmission incomplete: {reason}")]
    IncompleteVolume { reason: String },

    /// A chunk's expected predecessor is absent. Fatal for this attempt;
    /// re-list the volume's chunks and retry.
    #[error("chunk sequence gap: expected sequence {expected}, found {found}")]
    SequenceGap { expected: u16, found: u16 },

    #[error("invalid chunk name '{0}'")]
    InvalidChunkName(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Result type for reassembly operations.
pub type Result<T> = std::result::Result<T, ReassemblyError>;
