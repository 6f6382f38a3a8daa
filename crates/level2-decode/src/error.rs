//! Error types for the decode core.

use thiserror::Error;

/// Errors raised while decoding an archive record or chunk stream.
///
/// Structural errors always carry the byte offset (and segment/message
/// index) at which they occurred, so a corrupt record can be diagnosed
/// without re-parsing.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid volume header: {reason}")]
    InvalidHeader { reason: String },

    #[error(
        "malformed segment {segment} at byte {offset}: \
         declared {declared} bytes with {remaining} remaining"
    )]
    MalformedSegment {
        segment: usize,
        offset: usize,
        declared: usize,
        remaining: usize,
    },

    #[error("failed to decompress segment {segment} at byte {offset}: {reason}")]
    DecompressionFailure {
        segment: usize,
        offset: usize,
        reason: String,
    },

    #[error("message stream truncated in message {message} at byte {offset}")]
    TruncatedMessage { message: usize, offset: usize },

    #[error("unknown moment '{name}' in message {message}")]
    UnknownMoment { name: String, message: usize },
}

/// Result type for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;
