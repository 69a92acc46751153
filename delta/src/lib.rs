//! Field-level delta encoding for snapsync.
//!
//! A record type exposes its fields through a static [`Schema`]: an ordered
//! list of at most [`MAX_FIELDS`] primitive numeric fields. Diffing two
//! records yields a 16-bit [`ChangeMask`]; the delta on the wire is that mask
//! followed by the changed fields in ascending field order.
//!
//! ```text
//! u16 change_mask
//! <field bytes for each set bit, ascending field order>
//! ```
//!
//! # Design Principles
//!
//! - **Explicit schemas** - Records describe their fields through
//!   [`DeltaRecord`]; there is no reflection and no field pointers.
//! - **Checked limits** - The 16-field ceiling comes from the mask width and is
//!   enforced when a schema is built, never by silent truncation.
//! - **Exact comparison** - Floats compare with `==`. There is no tolerance
//!   window, and a NaN field always reports as changed.
//!
//! # Example
//!
//! ```
//! use bytecodec::{ByteReader, ByteWriter, Endian};
//! use delta::{delta_record, read_delta, write_delta};
//!
//! delta_record! {
//!     pub struct Probe {
//!         pub x: f32,
//!         pub hp: u16,
//!     }
//! }
//!
//! let baseline = Probe::default();
//! let current = Probe { x: 1.5, hp: 0 };
//!
//! let mut writer = ByteWriter::new(Endian::Little);
//! let mask = write_delta(&mut writer, &current, &baseline);
//! assert_eq!(mask.bits(), 0b01);
//!
//! let bytes = writer.finish();
//! assert_eq!(bytes.len(), 2 + 4);
//!
//! let mut decoded = baseline;
//! read_delta(&mut ByteReader::new(&bytes, Endian::Little), &mut decoded).unwrap();
//! assert_eq!(decoded, current);
//! ```

mod codec;
mod error;
mod field;
mod hash;
mod macros;
mod mask;
mod schema;

pub use codec::{
    change_mask, decode_fields, delta_len, read_delta, write_delta, write_full, write_masked,
    DecodedDelta,
};
pub use error::{DeltaError, DeltaResult, SchemaError, SchemaResult};
pub use field::{FieldDef, FieldKind, FieldType, FieldValue};
pub use hash::schema_fingerprint;
pub use mask::ChangeMask;
pub use schema::{DeltaRecord, Schema, MAX_FIELDS};
