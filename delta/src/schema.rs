//! Record schemas and the record trait.

use crate::error::{DeltaResult, SchemaError, SchemaResult};
use crate::field::{FieldDef, FieldValue};
use crate::mask::ChangeMask;

/// Maximum number of fields in a schema, fixed by the 16-bit change mask.
///
/// A record that needs more fields must be split into several records.
pub const MAX_FIELDS: usize = 16;

/// An ordered list of fields describing a record type.
///
/// Field order is the change-mask bit order and must be identical on both
/// ends of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Schema {
    name: &'static str,
    fields: &'static [FieldDef],
}

impl Schema {
    /// Creates a schema after validation.
    pub const fn new(name: &'static str, fields: &'static [FieldDef]) -> SchemaResult<Self> {
        match validate_fields(fields) {
            Ok(()) => Ok(Self { name, fields }),
            Err(err) => Err(err),
        }
    }

    /// Creates a schema, panicking if it is invalid.
    ///
    /// Intended for `const` items, where the panic becomes a compile error.
    ///
    /// # Panics
    ///
    /// Panics if the field list is empty, longer than [`MAX_FIELDS`], or
    /// contains duplicate names.
    #[must_use]
    pub const fn checked(name: &'static str, fields: &'static [FieldDef]) -> Self {
        match validate_fields(fields) {
            Ok(()) => Self { name, fields },
            Err(SchemaError::Empty) => panic!("record schema has no fields"),
            Err(SchemaError::TooManyFields { .. }) => {
                panic!("record schema has more than 16 fields")
            }
            Err(SchemaError::DuplicateField { .. }) => {
                panic!("record schema has duplicate field names")
            }
        }
    }

    /// Returns the record name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the fields in mask order.
    #[must_use]
    pub const fn fields(&self) -> &'static [FieldDef] {
        self.fields
    }

    /// Returns the number of fields.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema has no fields (never true for a valid schema).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the mask with a bit set for every field.
    #[must_use]
    pub const fn full_mask(&self) -> ChangeMask {
        ChangeMask::all(self.fields.len())
    }

    /// Returns the encoded size of a full record in bytes.
    #[must_use]
    pub fn full_len(&self) -> usize {
        self.fields.iter().map(|field| field.kind.size()).sum()
    }

    /// Validates schema invariants.
    pub const fn validate(&self) -> SchemaResult<()> {
        validate_fields(self.fields)
    }

    /// Returns the deterministic fingerprint of this schema.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        crate::hash::schema_fingerprint(self)
    }
}

/// A record that can be diffed field by field.
///
/// Implementations are normally generated by [`delta_record!`](crate::delta_record),
/// which builds the schema once per type and checks it at compile time.
/// `Default` supplies the baseline for entities a receiver has never seen.
pub trait DeltaRecord: Clone + Default {
    /// The record schema.
    const SCHEMA: Schema;

    /// Returns the record schema.
    fn schema() -> Schema {
        Self::SCHEMA
    }

    /// Returns the value of field `index`, or `None` past the last field.
    fn field(&self, index: usize) -> Option<FieldValue>;

    /// Assigns field `index`.
    ///
    /// # Errors
    ///
    /// Returns [`DeltaError::UnknownField`](crate::DeltaError::UnknownField) for
    /// an index past the last field and
    /// [`DeltaError::KindMismatch`](crate::DeltaError::KindMismatch) for a value
    /// of the wrong kind.
    fn set_field(&mut self, index: usize, value: FieldValue) -> DeltaResult<()>;
}

const fn validate_fields(fields: &[FieldDef]) -> SchemaResult<()> {
    if fields.is_empty() {
        return Err(SchemaError::Empty);
    }
    if fields.len() > MAX_FIELDS {
        return Err(SchemaError::TooManyFields {
            count: fields.len(),
            max: MAX_FIELDS,
        });
    }
    let mut i = 0;
    while i < fields.len() {
        let mut j = i + 1;
        while j < fields.len() {
            if str_eq(fields[i].name, fields[j].name) {
                return Err(SchemaError::DuplicateField {
                    name: fields[i].name,
                });
            }
            j += 1;
        }
        i += 1;
    }
    Ok(())
}

const fn str_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}
