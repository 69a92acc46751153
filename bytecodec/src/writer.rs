//! Append-only byte writer.

use crate::encode::WireEncode;
use crate::endian::Endian;
use crate::error::{ByteError, ByteResult};
use crate::MAX_PREFIXED_LEN;

macro_rules! write_primitive {
    ($($(#[$meta:meta])* $name:ident => $ty:ty),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(&mut self, value: $ty) {
                match self.endian {
                    Endian::Little => self.bytes.extend_from_slice(&value.to_le_bytes()),
                    Endian::Big => self.bytes.extend_from_slice(&value.to_be_bytes()),
                }
            }
        )*
    };
}

/// A byte writer for encoding packets.
///
/// Writes are appended to an internal buffer. Call [`finish`](Self::finish)
/// to take the final byte buffer, or [`flush`](Self::flush) to take it while
/// keeping the writer usable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteWriter {
    bytes: Vec<u8>,
    endian: Endian,
}

impl ByteWriter {
    /// Creates a new empty writer using the given byte order.
    #[must_use]
    pub fn new(endian: Endian) -> Self {
        Self {
            bytes: Vec::new(),
            endian,
        }
    }

    /// Creates a new writer with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(endian: Endian, bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            endian,
        }
    }

    /// Returns the byte order used by this writer.
    #[must_use]
    pub const fn endian(&self) -> Endian {
        self.endian
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Writes a single byte.
    pub fn write_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    /// Writes a single signed byte.
    pub fn write_i8(&mut self, value: i8) {
        self.bytes.push(value.to_le_bytes()[0]);
    }

    write_primitive! {
        /// Writes a `u16` in the configured byte order.
        write_u16 => u16,
        /// Writes a `u32` in the configured byte order.
        write_u32 => u32,
        /// Writes a `u64` in the configured byte order.
        write_u64 => u64,
        /// Writes an `i16` in the configured byte order.
        write_i16 => i16,
        /// Writes an `i32` in the configured byte order.
        write_i32 => i32,
        /// Writes an `i64` in the configured byte order.
        write_i64 => i64,
        /// Writes an `f32` bit pattern in the configured byte order.
        write_f32 => f32,
        /// Writes an `f64` bit pattern in the configured byte order.
        write_f64 => f64,
    }

    /// Writes a boolean as one byte (0 or 1).
    pub fn write_bool(&mut self, value: bool) {
        self.bytes.push(u8::from(value));
    }

    /// Writes raw bytes with no length prefix.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Writes a one-byte length prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ByteError::Overflow`] if `len` exceeds [`MAX_PREFIXED_LEN`].
    pub fn write_len(&mut self, len: usize) -> ByteResult<()> {
        let prefix = u8::try_from(len).map_err(|_| ByteError::Overflow {
            len,
            max: MAX_PREFIXED_LEN,
        })?;
        self.bytes.push(prefix);
        Ok(())
    }

    /// Writes a length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns [`ByteError::Overflow`] if the string is longer than 255 bytes.
    /// Nothing is written in that case.
    pub fn write_str(&mut self, value: &str) -> ByteResult<()> {
        self.write_len(value.len())?;
        self.write_raw(value.as_bytes());
        Ok(())
    }

    /// Writes any [`WireEncode`] value.
    pub fn write<T: WireEncode + ?Sized>(&mut self, value: &T) -> ByteResult<()> {
        value.encode(self)
    }

    /// Finishes writing and returns the byte buffer.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    /// Takes the bytes written so far, leaving the writer empty.
    pub fn flush(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }
}
