//! Deterministic schema fingerprints.

use blake3::Hasher;

use crate::Schema;

/// Computes a deterministic fingerprint of a schema.
///
/// Two peers can compare fingerprints out of band to confirm they diff and
/// apply with the same field list. Fingerprints never appear in packets.
#[must_use]
pub fn schema_fingerprint(schema: &Schema) -> u64 {
    let mut hasher = Hasher::new();
    write_str(&mut hasher, schema.name());
    write_u32(&mut hasher, schema.len() as u32);

    for field in schema.fields() {
        write_str(&mut hasher, field.name);
        hasher.update(&[field.kind.tag()]);
    }

    let hash = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(head)
}

fn write_str(hasher: &mut Hasher, value: &str) {
    write_u32(hasher, value.len() as u32);
    hasher.update(value.as_bytes());
}

fn write_u32(hasher: &mut Hasher, value: u32) {
    hasher.update(&value.to_le_bytes());
}
