//! Error types for the order protocol.

use thiserror::Error;

use crate::actor::ActorId;

/// Result type alias using [`ProtocolError`].
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors from the parts of the crate that touch files or configuration.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Failed to parse a configuration file.
    #[error("Failed to parse config '{path}': {message}")]
    ConfigParse {
        /// Path (or `<inline>`) of the config source.
        path: String,
        /// Error message.
        message: String,
    },

    /// Failed to read or write a file.
    #[error("IO error on '{path}': {source}")]
    Io {
        /// Path to the file.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Failed to (de)serialize a replay.
    #[error("Replay serialization failed: {0}")]
    ReplayFormat(String),

    /// Replay was written by an incompatible version.
    #[error("Replay version mismatch: expected {expected}, got {actual}")]
    ReplayVersion {
        /// Version this build reads.
        expected: u32,
        /// Version found in the file.
        actual: u32,
    },

    /// A single order failed to decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Why a single order frame could not be decoded.
///
/// Produced by the inner parser; the public decode boundary turns every
/// variant into "no order" plus one diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Ran out of bytes.
    #[error("Truncated frame: needed {needed} more bytes, {remaining} remaining")]
    Truncated {
        /// Bytes the next field needs.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// Leading byte is not a known frame tag.
    #[error("Unknown order tag 0x{0:02X}")]
    UnknownTag(u8),

    /// Target discriminant out of range.
    #[error("Unknown target kind {0}")]
    UnknownTargetKind(u8),

    /// Flag byte carries bits the frame does not allow.
    #[error("Unexpected order fields 0x{bits:02X} in frame 0x{tag:02X}")]
    UnexpectedFields {
        /// Frame tag.
        tag: u8,
        /// Offending bits.
        bits: u8,
    },

    /// String length prefix longer than five bytes or larger than `u32`.
    #[error("Malformed string length prefix")]
    LengthPrefixOverflow,

    /// String length exceeds the configured limit.
    #[error("String of {len} bytes exceeds limit of {max}")]
    StringTooLong {
        /// Declared length.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// String bytes are not UTF-8.
    #[error("String is not valid UTF-8")]
    InvalidUtf8,

    /// Issuer id present but not a live actor.
    #[error("Issuer actor {0} does not exist")]
    DanglingIssuer(ActorId),
}

impl DecodeError {
    /// Whether the reader is positioned past the whole record.
    ///
    /// Only a dangling issuer is detected after the full frame was read;
    /// every other failure leaves the reader somewhere inside the record.
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        matches!(self, Self::DanglingIssuer(_))
    }
}
