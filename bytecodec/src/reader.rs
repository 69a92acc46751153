//! Sequential byte reader with bounded operations.

use crate::encode::WireDecode;
use crate::endian::Endian;
use crate::error::{ByteError, ByteResult};

macro_rules! read_primitive {
    ($($(#[$meta:meta])* $name:ident => $ty:ty),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(&mut self) -> ByteResult<$ty> {
                let bytes = self.take::<{ std::mem::size_of::<$ty>() }>()?;
                Ok(match self.endian {
                    Endian::Little => <$ty>::from_le_bytes(bytes),
                    Endian::Big => <$ty>::from_be_bytes(bytes),
                })
            }
        )*
    };
}

/// A byte reader for decoding packets.
///
/// The read position starts at 0 and only moves forward. All reads are
/// bounds-checked; a read past the end returns [`ByteError::OutOfRange`] and
/// leaves the position unchanged.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ByteReader<'a> {
    /// Creates a new reader over a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8], endian: Endian) -> Self {
        Self {
            data,
            pos: 0,
            endian,
        }
    }

    /// Returns the byte order used by this reader.
    #[must_use]
    pub const fn endian(&self) -> Endian {
        self.endian
    }

    /// Returns the number of bytes remaining to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` if every byte has been consumed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the current byte position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> ByteResult<u8> {
        let [byte] = self.take::<1>()?;
        Ok(byte)
    }

    /// Reads a single signed byte.
    pub fn read_i8(&mut self) -> ByteResult<i8> {
        Ok(i8::from_le_bytes(self.take::<1>()?))
    }

    read_primitive! {
        /// Reads a `u16` in the configured byte order.
        read_u16 => u16,
        /// Reads a `u32` in the configured byte order.
        read_u32 => u32,
        /// Reads a `u64` in the configured byte order.
        read_u64 => u64,
        /// Reads an `i16` in the configured byte order.
        read_i16 => i16,
        /// Reads an `i32` in the configured byte order.
        read_i32 => i32,
        /// Reads an `i64` in the configured byte order.
        read_i64 => i64,
        /// Reads an `f32` bit pattern in the configured byte order.
        read_f32 => f32,
        /// Reads an `f64` bit pattern in the configured byte order.
        read_f64 => f64,
    }

    /// Reads a boolean byte.
    ///
    /// # Errors
    ///
    /// Returns [`ByteError::InvalidBool`] for any byte other than 0 or 1.
    pub fn read_bool(&mut self) -> ByteResult<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(ByteError::InvalidBool { value }),
        }
    }

    /// Reads `len` raw bytes, borrowing them from the underlying buffer.
    pub fn read_raw(&mut self, len: usize) -> ByteResult<&'a [u8]> {
        self.ensure(len)?;
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Reads a one-byte length prefix.
    pub fn read_len(&mut self) -> ByteResult<usize> {
        self.read_u8().map(usize::from)
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> ByteResult<String> {
        let len = self.read_len()?;
        let raw = self.read_raw(len)?;
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|_| ByteError::InvalidUtf8)
    }

    /// Reads any [`WireDecode`] value.
    pub fn read<T: WireDecode>(&mut self) -> ByteResult<T> {
        T::decode(self)
    }

    fn ensure(&self, len: usize) -> ByteResult<()> {
        let available = self.remaining();
        if len > available {
            return Err(ByteError::OutOfRange {
                requested: len,
                available,
            });
        }
        Ok(())
    }

    fn take<const N: usize>(&mut self) -> ByteResult<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }
}
