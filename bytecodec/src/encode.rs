//! Value-polymorphic encoding traits.

use crate::error::ByteResult;
use crate::reader::ByteReader;
use crate::writer::ByteWriter;

/// A value that can be appended to a [`ByteWriter`].
pub trait WireEncode {
    /// Encodes `self` at the end of the writer.
    ///
    /// # Errors
    ///
    /// Returns [`ByteError::Overflow`](crate::ByteError::Overflow) when a
    /// length-prefixed value is too long. Fixed-width values never fail.
    fn encode(&self, writer: &mut ByteWriter) -> ByteResult<()>;
}

/// A value that can be read from a [`ByteReader`].
pub trait WireDecode: Sized {
    /// Decodes a value at the reader's current position.
    fn decode(reader: &mut ByteReader<'_>) -> ByteResult<Self>;
}

macro_rules! impl_primitive {
    ($($ty:ty => $write:ident, $read:ident;)*) => {
        $(
            impl WireEncode for $ty {
                fn encode(&self, writer: &mut ByteWriter) -> ByteResult<()> {
                    writer.$write(*self);
                    Ok(())
                }
            }

            impl WireDecode for $ty {
                fn decode(reader: &mut ByteReader<'_>) -> ByteResult<Self> {
                    reader.$read()
                }
            }
        )*
    };
}

impl_primitive! {
    u8 => write_u8, read_u8;
    i8 => write_i8, read_i8;
    u16 => write_u16, read_u16;
    i16 => write_i16, read_i16;
    u32 => write_u32, read_u32;
    i32 => write_i32, read_i32;
    u64 => write_u64, read_u64;
    i64 => write_i64, read_i64;
    f32 => write_f32, read_f32;
    f64 => write_f64, read_f64;
    bool => write_bool, read_bool;
}

impl WireEncode for str {
    fn encode(&self, writer: &mut ByteWriter) -> ByteResult<()> {
        writer.write_str(self)
    }
}

impl WireEncode for String {
    fn encode(&self, writer: &mut ByteWriter) -> ByteResult<()> {
        writer.write_str(self)
    }
}

impl WireDecode for String {
    fn decode(reader: &mut ByteReader<'_>) -> ByteResult<Self> {
        reader.read_string()
    }
}

impl<T: WireEncode> WireEncode for [T] {
    fn encode(&self, writer: &mut ByteWriter) -> ByteResult<()> {
        writer.write_len(self.len())?;
        for item in self {
            item.encode(writer)?;
        }
        Ok(())
    }
}

impl<T: WireEncode> WireEncode for Vec<T> {
    fn encode(&self, writer: &mut ByteWriter) -> ByteResult<()> {
        self.as_slice().encode(writer)
    }
}

impl<T: WireDecode> WireDecode for Vec<T> {
    fn decode(reader: &mut ByteReader<'_>) -> ByteResult<Self> {
        let len = reader.read_len()?;
        let mut out = Self::with_capacity(len);
        for _ in 0..len {
            out.push(T::decode(reader)?);
        }
        Ok(out)
    }
}

impl<T: WireEncode + ?Sized> WireEncode for &T {
    fn encode(&self, writer: &mut ByteWriter) -> ByteResult<()> {
        (**self).encode(writer)
    }
}

// Tuples carry no prefix; arity is fixed by the type on both ends.
macro_rules! impl_tuple {
    ($($name:ident)+) => {
        impl<$($name: WireEncode),+> WireEncode for ($($name,)+) {
            #[allow(non_snake_case)]
            fn encode(&self, writer: &mut ByteWriter) -> ByteResult<()> {
                let ($($name,)+) = self;
                $($name.encode(writer)?;)+
                Ok(())
            }
        }

        impl<$($name: WireDecode),+> WireDecode for ($($name,)+) {
            fn decode(reader: &mut ByteReader<'_>) -> ByteResult<Self> {
                Ok(($($name::decode(reader)?,)+))
            }
        }
    };
}

impl_tuple!(A);
impl_tuple!(A B);
impl_tuple!(A B C);
impl_tuple!(A B C D);
impl_tuple!(A B C D E);
impl_tuple!(A B C D E F);
impl_tuple!(A B C D E F G);
impl_tuple!(A B C D E F G H);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ByteError, Endian};

    #[test]
    fn list_is_length_prefixed() {
        let mut writer = ByteWriter::new(Endian::Big);
        writer.write(&vec![1u16, 2, 3]).unwrap();
        assert_eq!(writer.finish(), vec![3, 0, 1, 0, 2, 0, 3]);
    }

    #[test]
    fn list_overflow() {
        let mut writer = ByteWriter::new(Endian::Little);
        let err = writer.write(&vec![0u8; 256]).unwrap_err();
        assert_eq!(err, ByteError::Overflow { len: 256, max: 255 });
    }

    #[test]
    fn nested_list_of_strings() {
        let value = vec![String::from("a"), String::from("bc")];
        let mut writer = ByteWriter::new(Endian::Little);
        writer.write(&value).unwrap();
        let bytes = writer.finish();
        assert_eq!(bytes, vec![2, 1, b'a', 2, b'b', b'c']);

        let mut reader = ByteReader::new(&bytes, Endian::Little);
        assert_eq!(reader.read::<Vec<String>>().unwrap(), value);
    }

    #[test]
    fn tuple_has_no_prefix() {
        let mut writer = ByteWriter::new(Endian::Little);
        writer.write(&(1u8, 2u16, true)).unwrap();
        assert_eq!(writer.finish(), vec![1, 2, 0, 1]);
    }

    #[test]
    fn tuple_roundtrip_eight() {
        let value = (1u8, -2i8, 3u16, -4i16, 5u32, -6i32, 7u64, String::from("x"));
        let mut writer = ByteWriter::new(Endian::Big);
        writer.write(&value).unwrap();
        let bytes = writer.finish();

        let mut reader = ByteReader::new(&bytes, Endian::Big);
        let decoded: (u8, i8, u16, i16, u32, i32, u64, String) = reader.read().unwrap();
        assert_eq!(decoded, value);
        assert!(reader.is_empty());
    }

    #[test]
    fn truncated_list_fails() {
        let mut reader = ByteReader::new(&[4, 1, 2], Endian::Little);
        assert!(matches!(
            reader.read::<Vec<u8>>(),
            Err(ByteError::OutOfRange { .. })
        ));
    }

    #[test]
    fn str_and_string_encode_identically() {
        let mut a = ByteWriter::new(Endian::Little);
        a.write("hey").unwrap();
        let mut b = ByteWriter::new(Endian::Little);
        b.write(&String::from("hey")).unwrap();
        assert_eq!(a.finish(), b.finish());
    }
}
