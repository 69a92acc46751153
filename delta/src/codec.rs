//! Diffing, delta encoding and delta decoding.

use bytecodec::{ByteReader, ByteWriter};

use crate::error::{DeltaError, DeltaResult};
use crate::field::FieldValue;
use crate::mask::ChangeMask;
use crate::schema::{DeltaRecord, Schema};

/// Computes the mask of fields that differ between `current` and `baseline`.
pub fn change_mask<R: DeltaRecord>(current: &R, baseline: &R) -> ChangeMask {
    let mut mask = ChangeMask::EMPTY;
    for index in 0..R::SCHEMA.len() {
        if current.field(index) != baseline.field(index) {
            mask.insert(index);
        }
    }
    mask
}

/// Writes the delta from `baseline` to `current` and returns its mask.
///
/// The output is the mask followed by every changed field in ascending order.
/// Identical records produce a 2-byte delta.
pub fn write_delta<R: DeltaRecord>(
    writer: &mut ByteWriter,
    current: &R,
    baseline: &R,
) -> ChangeMask {
    let mask = change_mask(current, baseline);
    write_masked(writer, current, mask);
    mask
}

/// Writes `record` with every field marked as changed.
pub fn write_full<R: DeltaRecord>(writer: &mut ByteWriter, record: &R) -> ChangeMask {
    let mask = R::SCHEMA.full_mask();
    write_masked(writer, record, mask);
    mask
}

/// Writes `mask` followed by the fields of `record` selected by it.
pub fn write_masked<R: DeltaRecord>(writer: &mut ByteWriter, record: &R, mask: ChangeMask) {
    writer.write_u16(mask.bits());
    for index in mask.iter() {
        if let Some(value) = record.field(index) {
            value.encode(writer);
        }
    }
}

/// Reads a delta and applies it onto `dest`, returning the decoded mask.
///
/// Fields whose bit is clear keep the value `dest` already holds, so `dest`
/// must hold the baseline the sender diffed against. On error `dest` may be
/// partially updated.
///
/// # Errors
///
/// Returns [`DeltaError::UnknownFields`] if the mask addresses fields the
/// schema does not have, or a byte error if the input is truncated.
pub fn read_delta<R: DeltaRecord>(reader: &mut ByteReader<'_>, dest: &mut R) -> DeltaResult<ChangeMask> {
    let mask = read_mask(&R::SCHEMA, reader)?;
    for (index, field) in R::SCHEMA.fields().iter().enumerate() {
        if mask.contains(index) {
            let value = FieldValue::decode(field.kind, reader)?;
            dest.set_field(index, value)?;
        }
    }
    Ok(mask)
}

/// Returns the encoded size of the delta from `baseline` to `current`.
pub fn delta_len<R: DeltaRecord>(current: &R, baseline: &R) -> usize {
    let mask = change_mask(current, baseline);
    2 + R::SCHEMA
        .fields()
        .iter()
        .enumerate()
        .filter(|(index, _)| mask.contains(*index))
        .map(|(_, field)| field.kind.size())
        .sum::<usize>()
}

/// A delta decoded against a schema without a concrete record type.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedDelta {
    pub mask: ChangeMask,
    /// Changed fields as `(field index, value)` in ascending order.
    pub fields: Vec<(usize, FieldValue)>,
}

impl DecodedDelta {
    /// Encoded size of this delta in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        2 + self
            .fields
            .iter()
            .map(|(_, value)| value.kind().size())
            .sum::<usize>()
    }
}

/// Decodes one delta using only the schema descriptor.
///
/// Used by inspection tooling that has no record type at hand.
pub fn decode_fields(schema: &Schema, reader: &mut ByteReader<'_>) -> DeltaResult<DecodedDelta> {
    let mask = read_mask(schema, reader)?;
    let mut fields = Vec::with_capacity(mask.count() as usize);
    for (index, field) in schema.fields().iter().enumerate() {
        if mask.contains(index) {
            fields.push((index, FieldValue::decode(field.kind, reader)?));
        }
    }
    Ok(DecodedDelta { mask, fields })
}

fn read_mask(schema: &Schema, reader: &mut ByteReader<'_>) -> DeltaResult<ChangeMask> {
    let mask = ChangeMask::from_bits(reader.read_u16()?);
    if !mask.is_subset_of(schema.full_mask()) {
        return Err(DeltaError::UnknownFields {
            mask: mask.bits(),
            field_count: schema.len(),
        });
    }
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{delta_record, FieldKind};
    use bytecodec::Endian;

    delta_record! {
        struct Sample {
            x: f32,
            y: f32,
            heading: f64,
            anim: u8,
            hp: i16,
        }
    }

    fn sample() -> Sample {
        Sample {
            x: 5.1,
            y: 0.0,
            heading: 0.555_555_555_5,
            anim: 3,
            hp: -20,
        }
    }

    #[test]
    fn mask_marks_exact_differences() {
        let baseline = Sample::default();
        let current = sample();
        let mask = change_mask(&current, &baseline);
        assert_eq!(mask.bits(), 0b11101);
    }

    #[test]
    fn identical_records_have_empty_mask() {
        let record = sample();
        let mut writer = ByteWriter::new(Endian::Little);
        let mask = write_delta(&mut writer, &record, &record);
        assert!(mask.is_empty());
        assert_eq!(writer.finish(), vec![0, 0]);
    }

    #[test]
    fn delta_len_matches_written_bytes() {
        let baseline = Sample::default();
        let current = sample();
        let mut writer = ByteWriter::new(Endian::Big);
        write_delta(&mut writer, &current, &baseline);
        assert_eq!(writer.len(), delta_len(&current, &baseline));
        assert_eq!(writer.len(), 2 + 4 + 8 + 1 + 2);
    }

    #[test]
    fn fields_are_written_in_ascending_order() {
        let baseline = Sample::default();
        let current = Sample {
            anim: 0xAA,
            x: 1.0,
            ..Sample::default()
        };
        let mut writer = ByteWriter::new(Endian::Big);
        write_delta(&mut writer, &current, &baseline);
        assert_eq!(
            writer.finish(),
            vec![0x00, 0b1001, 0x3F, 0x80, 0x00, 0x00, 0xAA]
        );
    }

    #[test]
    fn apply_keeps_unset_fields() {
        let baseline = sample();
        let current = Sample { hp: 99, ..baseline };

        let mut writer = ByteWriter::new(Endian::Little);
        write_delta(&mut writer, &current, &baseline);
        let bytes = writer.finish();

        let mut dest = baseline;
        let mask = read_delta(&mut ByteReader::new(&bytes, Endian::Little), &mut dest).unwrap();
        assert_eq!(mask.bits(), 1 << 4);
        assert_eq!(dest, current);
    }

    #[test]
    fn full_write_sets_every_field() {
        let record = Sample::default();
        let mut writer = ByteWriter::new(Endian::Little);
        let mask = write_full(&mut writer, &record);
        assert_eq!(mask, ChangeMask::all(5));
        assert_eq!(writer.len(), 2 + Sample::SCHEMA.full_len());
    }

    #[test]
    fn read_rejects_unknown_bits() {
        let bytes = [0x20, 0x00];
        let mut dest = Sample::default();
        let err = read_delta(&mut ByteReader::new(&bytes, Endian::Little), &mut dest).unwrap_err();
        assert_eq!(
            err,
            DeltaError::UnknownFields {
                mask: 0x20,
                field_count: 5
            }
        );
    }

    #[test]
    fn read_truncated_fails() {
        let bytes = [0x01, 0x00, 0x00];
        let mut dest = Sample::default();
        let err = read_delta(&mut ByteReader::new(&bytes, Endian::Little), &mut dest).unwrap_err();
        assert!(matches!(err, DeltaError::Bytes(_)));
    }

    #[test]
    fn nan_field_always_changes() {
        let a = Sample {
            x: f32::NAN,
            ..Sample::default()
        };
        assert!(change_mask(&a, &a).contains(0));
    }

    #[test]
    fn decode_fields_by_schema() {
        let baseline = Sample::default();
        let current = sample();
        let mut writer = ByteWriter::new(Endian::Little);
        write_delta(&mut writer, &current, &baseline);
        let bytes = writer.finish();

        let decoded =
            decode_fields(&Sample::SCHEMA, &mut ByteReader::new(&bytes, Endian::Little)).unwrap();
        assert_eq!(decoded.encoded_len(), bytes.len());
        let kinds: Vec<FieldKind> = decoded.fields.iter().map(|(_, v)| v.kind()).collect();
        assert_eq!(
            kinds,
            vec![FieldKind::F32, FieldKind::F64, FieldKind::U8, FieldKind::I16]
        );
    }
}
