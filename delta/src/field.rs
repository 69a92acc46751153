//! Field kinds, definitions and values.

use std::fmt;

use bytecodec::{ByteReader, ByteResult, ByteWriter};

/// The primitive type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FieldKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl FieldKind {
    /// Encoded size of the field in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    /// Rust name of the primitive type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::U64 => "u64",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    pub(crate) const fn tag(self) -> u8 {
        match self {
            Self::U8 => 0,
            Self::I8 => 1,
            Self::U16 => 2,
            Self::I16 => 3,
            Self::U32 => 4,
            Self::I32 => 5,
            Self::U64 => 6,
            Self::I64 => 7,
            Self::F32 => 8,
            Self::F64 => 9,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field definition within a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    /// Creates a field definition.
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// A field value in decoded form.
///
/// Equality is the change test used by the differ: exact for integers and
/// `==` for floats.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl FieldValue {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::U8(_) => FieldKind::U8,
            Self::I8(_) => FieldKind::I8,
            Self::U16(_) => FieldKind::U16,
            Self::I16(_) => FieldKind::I16,
            Self::U32(_) => FieldKind::U32,
            Self::I32(_) => FieldKind::I32,
            Self::U64(_) => FieldKind::U64,
            Self::I64(_) => FieldKind::I64,
            Self::F32(_) => FieldKind::F32,
            Self::F64(_) => FieldKind::F64,
        }
    }

    /// Writes the value in the writer's byte order.
    pub fn encode(&self, writer: &mut ByteWriter) {
        match *self {
            Self::U8(v) => writer.write_u8(v),
            Self::I8(v) => writer.write_i8(v),
            Self::U16(v) => writer.write_u16(v),
            Self::I16(v) => writer.write_i16(v),
            Self::U32(v) => writer.write_u32(v),
            Self::I32(v) => writer.write_i32(v),
            Self::U64(v) => writer.write_u64(v),
            Self::I64(v) => writer.write_i64(v),
            Self::F32(v) => writer.write_f32(v),
            Self::F64(v) => writer.write_f64(v),
        }
    }

    /// Reads a value of the given kind.
    pub fn decode(kind: FieldKind, reader: &mut ByteReader<'_>) -> ByteResult<Self> {
        Ok(match kind {
            FieldKind::U8 => Self::U8(reader.read_u8()?),
            FieldKind::I8 => Self::I8(reader.read_i8()?),
            FieldKind::U16 => Self::U16(reader.read_u16()?),
            FieldKind::I16 => Self::I16(reader.read_i16()?),
            FieldKind::U32 => Self::U32(reader.read_u32()?),
            FieldKind::I32 => Self::I32(reader.read_i32()?),
            FieldKind::U64 => Self::U64(reader.read_u64()?),
            FieldKind::I64 => Self::I64(reader.read_i64()?),
            FieldKind::F32 => Self::F32(reader.read_f32()?),
            FieldKind::F64 => Self::F64(reader.read_f64()?),
        })
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
        }
    }
}

/// A Rust primitive usable as a record field.
pub trait FieldType: Copy + PartialEq {
    /// The field kind for this type.
    const KIND: FieldKind;

    /// Wraps the value.
    fn into_value(self) -> FieldValue;

    /// Unwraps a value of the matching kind.
    fn from_value(value: FieldValue) -> Option<Self>;
}

macro_rules! impl_field_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FieldType for $ty {
                const KIND: FieldKind = FieldKind::$variant;

                fn into_value(self) -> FieldValue {
                    FieldValue::$variant(self)
                }

                fn from_value(value: FieldValue) -> Option<Self> {
                    match value {
                        FieldValue::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_field_type! {
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
    f32 => F32,
    f64 => F64,
}
