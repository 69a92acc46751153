//! Schema validation and delta decoding errors.

use std::fmt;

use crate::field::FieldKind;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for delta operations.
pub type DeltaResult<T> = Result<T, DeltaError>;

/// Errors that can occur when building or validating a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaError {
    /// A schema must describe at least one field.
    Empty,

    /// More fields than the change mask can address.
    TooManyFields { count: usize, max: usize },

    /// Two fields share a name.
    DuplicateField { name: &'static str },
}

/// Errors that can occur while decoding or applying a delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaError {
    /// Byte-level decoding error.
    Bytes(bytecodec::ByteError),

    /// The change mask has bits set at or above the schema's field count.
    UnknownFields { mask: u16, field_count: usize },

    /// A field index is outside the record's schema.
    UnknownField { index: usize },

    /// A value of the wrong kind was assigned to a field.
    KindMismatch {
        index: usize,
        expected: FieldKind,
        found: FieldKind,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "schema has no fields"),
            Self::TooManyFields { count, max } => {
                write!(f, "schema has {count} fields, the change mask holds {max}")
            }
            Self::DuplicateField { name } => write!(f, "duplicate field name `{name}`"),
        }
    }
}

impl std::error::Error for SchemaError {}

impl fmt::Display for DeltaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(e) => write!(f, "byte error: {e}"),
            Self::UnknownFields { mask, field_count } => {
                write!(
                    f,
                    "change mask 0x{mask:04X} sets bits beyond {field_count} fields"
                )
            }
            Self::UnknownField { index } => write!(f, "no field at index {index}"),
            Self::KindMismatch {
                index,
                expected,
                found,
            } => {
                write!(
                    f,
                    "field {index} expects {expected} but got {found}"
                )
            }
        }
    }
}

impl std::error::Error for DeltaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bytes(e) => Some(e),
            _ => None,
        }
    }
}

impl From<bytecodec::ByteError> for DeltaError {
    fn from(err: bytecodec::ByteError) -> Self {
        Self::Bytes(err)
    }
}
