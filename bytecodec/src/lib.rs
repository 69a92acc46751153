//! Byte-level encoding primitives for snapsync.
//!
//! This crate provides [`ByteWriter`] and [`ByteReader`] for byte-exact binary
//! encoding, plus the [`WireEncode`] / [`WireDecode`] traits that make both
//! polymorphic over the value being written or read.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Values are converted with `to_*_bytes` / `from_*_bytes`.
//! - **Bounded reads** - Every read is bounds-checked and fails with
//!   [`ByteError::OutOfRange`] instead of touching memory past the buffer.
//! - **Explicit byte order** - The wire [`Endian`] is a value handed to each
//!   writer and reader. The wire carries no byte-order marker, so both ends of
//!   an exchange must be configured identically; a mismatch corrupts values
//!   silently rather than failing.
//! - **No domain knowledge** - This crate knows nothing about entities or snapshots.
//!
//! # Example
//!
//! ```
//! use bytecodec::{ByteReader, ByteWriter, Endian};
//!
//! let mut writer = ByteWriter::new(Endian::Big);
//! writer.write_u32(0xDEAD_BEEF);
//! writer.write(&String::from("hello")).unwrap();
//! writer.write(&(7u8, -2i16)).unwrap();
//!
//! let bytes = writer.finish();
//!
//! let mut reader = ByteReader::new(&bytes, Endian::Big);
//! assert_eq!(reader.read_u32().unwrap(), 0xDEAD_BEEF);
//! assert_eq!(reader.read::<String>().unwrap(), "hello");
//! assert_eq!(reader.read::<(u8, i16)>().unwrap(), (7, -2));
//! assert!(reader.is_empty());
//! ```

mod encode;
mod endian;
mod error;
mod reader;
mod writer;

pub use encode::{WireDecode, WireEncode};
pub use endian::Endian;
pub use error::{ByteError, ByteResult};
pub use reader::ByteReader;
pub use writer::ByteWriter;

/// Maximum element count of a length-prefixed string or list.
///
/// The prefix is a single byte on the wire.
pub const MAX_PREFIXED_LEN: usize = u8::MAX as usize;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_roundtrip() {
        let writer = ByteWriter::default();
        let bytes = writer.finish();
        assert!(bytes.is_empty());

        let reader = ByteReader::new(&bytes, Endian::Little);
        assert!(reader.is_empty());
    }

    #[test]
    fn mixed_roundtrip_both_orders() {
        for endian in [Endian::Little, Endian::Big] {
            let mut writer = ByteWriter::new(endian);
            writer.write_u64(0xff00_ee33_4466_aa55);
            writer.write_u64(0x123);
            writer.write_i32(0x00ff_3344);
            writer.write_i32(i32::MIN);
            writer.write_f64(0.124_385_738_472);
            writer.write_f64(10_024.132_432_473_874);
            writer.write_f32(13.243_23);
            writer.write_f32(0.111_112_43);
            writer.write_u8(0x01);
            let bytes = writer.finish();
            assert_eq!(bytes.len(), 8 + 8 + 4 + 4 + 8 + 8 + 4 + 4 + 1);

            let mut reader = ByteReader::new(&bytes, endian);
            assert_eq!(reader.read_u64().unwrap(), 0xff00_ee33_4466_aa55);
            assert_eq!(reader.read_u64().unwrap(), 0x123);
            assert_eq!(reader.read_i32().unwrap(), 0x00ff_3344);
            assert_eq!(reader.read_i32().unwrap(), i32::MIN);
            assert_eq!(reader.read_f64().unwrap().to_bits(), 0.124_385_738_472f64.to_bits());
            assert_eq!(
                reader.read_f64().unwrap().to_bits(),
                10_024.132_432_473_874f64.to_bits()
            );
            assert_eq!(reader.read_f32().unwrap().to_bits(), 13.243_23f32.to_bits());
            assert_eq!(reader.read_f32().unwrap().to_bits(), 0.111_112_43f32.to_bits());
            assert_eq!(reader.read_u8().unwrap(), 0x01);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn mismatched_order_corrupts_silently() {
        let mut writer = ByteWriter::new(Endian::Big);
        writer.write_u16(0x0102);
        let bytes = writer.finish();

        let mut reader = ByteReader::new(&bytes, Endian::Little);
        assert_eq!(reader.read_u16().unwrap(), 0x0201);
    }

    #[test]
    fn doctest_example() {
        let mut writer = ByteWriter::new(Endian::Big);
        writer.write_u32(0xDEAD_BEEF);
        writer.write(&String::from("hello")).unwrap();
        let bytes = writer.finish();

        let mut reader = ByteReader::new(&bytes, Endian::Big);
        assert_eq!(reader.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(reader.read::<String>().unwrap(), "hello");
    }
}
