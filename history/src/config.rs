//! History configuration.

use std::num::NonZeroUsize;

use bytecodec::Endian;

/// Ring capacity used on the authoritative side.
pub const SERVER_CAPACITY: NonZeroUsize = nonzero(64);

/// Ring capacity used on the observing side.
pub const CLIENT_CAPACITY: NonZeroUsize = nonzero(3);

/// Configuration for a [`History`](crate::History).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Number of snapshots retained in the ring.
    ///
    /// Also the distance behind the current sequence at which an
    /// acknowledgement is too old for an incremental packet.
    pub capacity: NonZeroUsize,
    /// Byte order of every packet written or read.
    pub endian: Endian,
    /// Maximum number of entity entries accepted in one packet.
    pub max_entities_per_packet: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::server()
    }
}

impl HistoryConfig {
    /// Configuration for the authoritative side.
    #[must_use]
    pub const fn server() -> Self {
        Self {
            capacity: SERVER_CAPACITY,
            endian: Endian::Little,
            max_entities_per_packet: 4096,
        }
    }

    /// Configuration for an observer.
    #[must_use]
    pub const fn client() -> Self {
        Self {
            capacity: CLIENT_CAPACITY,
            endian: Endian::Little,
            max_entities_per_packet: 4096,
        }
    }

    /// Creates a configuration suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            capacity: nonzero(4),
            endian: Endian::Little,
            max_entities_per_packet: 64,
        }
    }

    /// Returns the configuration with a different capacity.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Returns the configuration with a different byte order.
    #[must_use]
    pub const fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }
}

const fn nonzero(n: usize) -> NonZeroUsize {
    match NonZeroUsize::new(n) {
        Some(n) => n,
        None => panic!("capacity must be non-zero"),
    }
}
