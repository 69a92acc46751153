//! Inspection tools for snapsync packets.
//!
//! Packets carry no schema information, so inspection decodes them against a
//! schema supplied by the caller and reports, per entity entry, the change
//! mask, the changed fields with their values, and byte sizes.
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to see what each packet spends bytes on.

use std::fmt::Write as _;

use bytecodec::{ByteReader, Endian};
use delta::{decode_fields, DeltaError, FieldDef, FieldKind, FieldValue, Schema};
use serde::Serialize;

/// Size of the packet header (`u32` sequence, `u32` tick).
pub const HEADER_LEN: usize = 8;

/// Size of an entity id on the wire.
pub const ENTITY_ID_LEN: usize = 4;

/// Decoded view of one update packet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    pub schema: &'static str,
    pub seq: u32,
    pub tick: u32,
    pub total_bytes: usize,
    pub entries: Vec<EntryReport>,
    /// Entries that carry every field of the schema.
    pub full_entries: usize,
}

/// One `(entity id, delta)` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryReport {
    pub entity_id: u32,
    pub mask: u16,
    pub bytes: usize,
    pub changed: Vec<ChangedField>,
}

/// A changed field inside an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangedField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub value: FieldValue,
}

/// Description of a schema for the `schema` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    pub name: &'static str,
    pub fingerprint: String,
    pub field_count: usize,
    pub full_record_bytes: usize,
    pub fields: Vec<FieldDef>,
}

/// Decodes `bytes` as an update packet of records described by `schema`.
pub fn inspect_packet(
    bytes: &[u8],
    schema: &Schema,
    endian: Endian,
) -> Result<InspectReport, DeltaError> {
    let mut reader = ByteReader::new(bytes, endian);
    let seq = reader.read_u32()?;
    let tick = reader.read_u32()?;

    let full_mask = schema.full_mask();
    let mut entries = Vec::new();
    while !reader.is_empty() {
        let entity_id = reader.read_u32()?;
        let decoded = decode_fields(schema, &mut reader)?;
        let changed = decoded
            .fields
            .iter()
            .map(|(index, value)| ChangedField {
                name: schema.fields()[*index].name,
                kind: value.kind(),
                value: *value,
            })
            .collect();
        entries.push(EntryReport {
            entity_id,
            mask: decoded.mask.bits(),
            bytes: ENTITY_ID_LEN + decoded.encoded_len(),
            changed,
        });
    }

    let full_entries = entries
        .iter()
        .filter(|entry| entry.mask == full_mask.bits())
        .count();
    Ok(InspectReport {
        schema: schema.name(),
        seq,
        tick,
        total_bytes: bytes.len(),
        entries,
        full_entries,
    })
}

/// Describes `schema`.
pub fn schema_report(schema: &Schema) -> SchemaReport {
    SchemaReport {
        name: schema.name(),
        fingerprint: format!("0x{:016x}", schema.fingerprint()),
        field_count: schema.len(),
        full_record_bytes: schema.full_len(),
        fields: schema.fields().to_vec(),
    }
}

/// Renders an inspection report for terminals.
pub fn format_report_pretty(report: &InspectReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "seq: {} tick: {} size: {} bytes ({} header)",
        report.seq, report.tick, report.total_bytes, HEADER_LEN
    );
    let _ = writeln!(
        out,
        "{} entries ({} full), schema {}",
        report.entries.len(),
        report.full_entries,
        report.schema
    );
    for entry in &report.entries {
        let _ = writeln!(
            out,
            "  entity {}: mask {:#06x} ({} bytes)",
            entry.entity_id, entry.mask, entry.bytes
        );
        for field in &entry.changed {
            let _ = writeln!(out, "    {}: {} = {}", field.name, field.kind, field.value);
        }
    }
    out
}

/// Renders a schema report for terminals.
pub fn format_schema_pretty(report: &SchemaReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} fields, {} bytes full, fingerprint {})",
        report.name, report.field_count, report.full_record_bytes, report.fingerprint
    );
    for (bit, field) in report.fields.iter().enumerate() {
        let _ = writeln!(out, "  bit {bit:>2}: {} {}", field.name, field.kind);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytecodec::ByteWriter;
    use delta::{write_delta, write_full, DeltaRecord};
    use demo_schema::CreatureStatus;

    fn packet(endian: Endian) -> Vec<u8> {
        let mut writer = ByteWriter::new(endian);
        writer.write_u32(12);
        writer.write_u32(340);

        writer.write_u32(5);
        write_full(&mut writer, &CreatureStatus::default());

        let baseline = CreatureStatus::default();
        let current = CreatureStatus {
            x: 2.0,
            anim: 3,
            ..baseline
        };
        writer.write_u32(9);
        write_delta(&mut writer, &current, &baseline);
        writer.finish()
    }

    #[test]
    fn inspect_reports_entries() {
        let bytes = packet(Endian::Little);
        let report = inspect_packet(&bytes, &CreatureStatus::SCHEMA, Endian::Little).unwrap();
        assert_eq!(report.seq, 12);
        assert_eq!(report.tick, 340);
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.full_entries, 1);
        assert_eq!(report.entries[0].bytes, 4 + 2 + 35);

        let second = &report.entries[1];
        assert_eq!(second.entity_id, 9);
        assert_eq!(second.mask, 0b1_0001);
        let names: Vec<&str> = second.changed.iter().map(|field| field.name).collect();
        assert_eq!(names, vec!["x", "anim"]);
        assert_eq!(second.changed[1].value, FieldValue::U8(3));

        let sum: usize = report.entries.iter().map(|entry| entry.bytes).sum();
        assert_eq!(HEADER_LEN + sum, report.total_bytes);
    }

    #[test]
    fn inspect_big_endian() {
        let bytes = packet(Endian::Big);
        let report = inspect_packet(&bytes, &CreatureStatus::SCHEMA, Endian::Big).unwrap();
        assert_eq!(report.seq, 12);
        assert_eq!(report.entries[1].entity_id, 9);
    }

    #[test]
    fn inspect_truncated_packet_fails() {
        let bytes = packet(Endian::Little);
        assert!(inspect_packet(&bytes[..bytes.len() - 1], &CreatureStatus::SCHEMA, Endian::Little)
            .is_err());
        assert!(inspect_packet(&bytes[..3], &CreatureStatus::SCHEMA, Endian::Little).is_err());
    }

    #[test]
    fn pretty_output_names_fields() {
        let bytes = packet(Endian::Little);
        let report = inspect_packet(&bytes, &CreatureStatus::SCHEMA, Endian::Little).unwrap();
        let text = format_report_pretty(&report);
        assert!(text.contains("seq: 12 tick: 340"));
        assert!(text.contains("entity 9: mask 0x0011"));
        assert!(text.contains("anim: u8 = 3"));
    }

    #[test]
    fn json_output_is_structured() {
        let bytes = packet(Endian::Little);
        let report = inspect_packet(&bytes, &CreatureStatus::SCHEMA, Endian::Little).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entries"][1]["changed"][0]["name"], "x");
        assert_eq!(json["entries"][1]["changed"][0]["kind"], "f32");
        assert_eq!(json["entries"][1]["changed"][1]["value"], 3);
    }

    #[test]
    fn schema_report_lists_fields() {
        let report = schema_report(&CreatureStatus::SCHEMA);
        assert_eq!(report.field_count, 13);
        assert_eq!(report.full_record_bytes, 35);
        assert!(report.fingerprint.starts_with("0x"));
        assert_eq!(report.fingerprint.len(), 18);
        let text = format_schema_pretty(&report);
        assert!(text.contains("bit 12: equipment6 u16"));
    }
}
