//! Error types for history operations.

use std::fmt;

use bytecodec::ByteError;
use delta::DeltaError;

use crate::Seq;

/// Result type for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Errors that can occur when querying a history or applying a packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// Byte-level decoding error in a packet header or entity id.
    Bytes(ByteError),

    /// Delta decoding error in an entity entry.
    Delta(DeltaError),

    /// The sequence is not retained by the ring.
    SequenceOutOfWindow {
        requested: Seq,
        oldest: Seq,
        newest: Seq,
    },

    /// The packet is older than the receiver's current sequence.
    StalePacket { received: Seq, current: Seq },

    /// The acknowledged baseline has fallen out of the receiver's window.
    UnusablePacket {
        last_ack: Seq,
        current: Seq,
        capacity: usize,
    },

    /// The packet carries more entity entries than allowed.
    TooManyEntities { limit: usize },
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(e) => write!(f, "byte error: {e}"),
            Self::Delta(e) => write!(f, "delta error: {e}"),
            Self::SequenceOutOfWindow {
                requested,
                oldest,
                newest,
            } => {
                write!(
                    f,
                    "sequence {requested} outside retained window {oldest}..={newest}"
                )
            }
            Self::StalePacket { received, current } => {
                write!(f, "stale packet {received}, history is at {current}")
            }
            Self::UnusablePacket {
                last_ack,
                current,
                capacity,
            } => {
                write!(
                    f,
                    "ack {last_ack} is {capacity} or more behind {current}, baseline is gone"
                )
            }
            Self::TooManyEntities { limit } => {
                write!(f, "packet exceeds {limit} entity entries")
            }
        }
    }
}

impl std::error::Error for HistoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bytes(e) => Some(e),
            Self::Delta(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ByteError> for HistoryError {
    fn from(err: ByteError) -> Self {
        Self::Bytes(err)
    }
}

impl From<DeltaError> for HistoryError {
    fn from(err: DeltaError) -> Self {
        Self::Delta(err)
    }
}
