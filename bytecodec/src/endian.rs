//! Wire byte order.

/// Byte order of multi-byte values on the wire.
///
/// Writers and readers are constructed with an explicit `Endian`; there is no
/// process-wide setting. Both ends of a packet exchange must use the same
/// value, because packets carry no marker that would let a reader detect the
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Endian {
    /// Least significant byte first.
    #[default]
    Little,
    /// Most significant byte first (network order).
    Big,
}

impl Endian {
    /// Returns the byte order of the host.
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }

    /// Returns `true` if values must be byte-swapped relative to the host.
    #[must_use]
    pub const fn swaps_on_host(self) -> bool {
        !matches!(
            (self, Self::native()),
            (Self::Little, Self::Little) | (Self::Big, Self::Big)
        )
    }
}
