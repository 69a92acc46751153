//! Error types for byte-level operations.

use std::fmt;

/// Result type for byte-level operations.
pub type ByteResult<T> = Result<T, ByteError>;

/// Errors that can occur during byte-level encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteError {
    /// Attempted to read past the end of the buffer.
    OutOfRange {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// A length-prefixed string or list is longer than the one-byte prefix allows.
    Overflow {
        /// Length of the value that was written.
        len: usize,
        /// Maximum representable length.
        max: usize,
    },

    /// A decoded string is not valid UTF-8.
    InvalidUtf8,

    /// A decoded boolean byte is neither 0 nor 1.
    InvalidBool {
        /// The byte that was read.
        value: u8,
    },
}

impl fmt::Display for ByteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bytes but only {available} bytes available"
                )
            }
            Self::Overflow { len, max } => {
                write!(f, "length {len} exceeds the maximum prefixed length {max}")
            }
            Self::InvalidUtf8 => write!(f, "string is not valid utf-8"),
            Self::InvalidBool { value } => write!(f, "invalid bool byte 0x{value:02X}"),
        }
    }
}

impl std::error::Error for ByteError {}
