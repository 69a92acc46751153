use bytecodec::{ByteReader, ByteWriter, Endian};
use delta::{
    decode_fields, delta_record, read_delta, write_delta, write_full, ChangeMask, DeltaError,
    DeltaRecord, FieldKind, FieldValue,
};

delta_record! {
    pub struct Status {
        pub x: f32,
        pub y: f32,
        pub z: f32,
        pub heading: f64,
        pub anim: u8,
        pub animframe: u8,
        pub faction: u8,
        pub equipment1: u16,
        pub equipment2: u16,
        pub equipment3: u16,
        pub equipment4: u16,
        pub equipment5: u16,
        pub equipment6: u16,
    }
}

#[test]
fn position_only_change() {
    let baseline = Status::default();
    let current = Status {
        x: 1.0,
        y: 2.0,
        z: 3.0,
        ..baseline
    };

    let mut writer = ByteWriter::new(Endian::Little);
    let mask = write_delta(&mut writer, &current, &baseline);
    assert_eq!(mask.bits(), 0b111);
    assert_eq!(writer.len(), 2 + 3 * 4);
}

#[test]
fn full_record_size() {
    let mut writer = ByteWriter::new(Endian::Little);
    write_full(&mut writer, &Status::default());
    // 3 * f32 + f64 + 3 * u8 + 6 * u16
    assert_eq!(writer.len(), 2 + 12 + 8 + 3 + 12);
}

#[test]
fn deltas_chain_across_baselines() {
    let s0 = Status::default();
    let s1 = Status { anim: 4, ..s0 };
    let s2 = Status {
        equipment6: 900,
        ..s1
    };

    let mut client = s0;
    for (from, to) in [(&s0, &s1), (&s1, &s2)] {
        let mut writer = ByteWriter::new(Endian::Big);
        write_delta(&mut writer, to, from);
        let bytes = writer.finish();
        read_delta(&mut ByteReader::new(&bytes, Endian::Big), &mut client).unwrap();
    }
    assert_eq!(client, s2);
}

#[test]
fn top_bit_rejected_for_thirteen_fields() {
    let bytes = 0x8000u16.to_le_bytes();
    let mut dest = Status::default();
    let err = read_delta(&mut ByteReader::new(&bytes, Endian::Little), &mut dest).unwrap_err();
    assert!(matches!(err, DeltaError::UnknownFields { mask: 0x8000, .. }));
}

#[test]
fn schema_decoding_names_fields() {
    let baseline = Status::default();
    let current = Status {
        heading: 1.25,
        equipment2: 7,
        ..baseline
    };
    let mut writer = ByteWriter::new(Endian::Little);
    write_delta(&mut writer, &current, &baseline);
    let bytes = writer.finish();

    let decoded = decode_fields(&Status::SCHEMA, &mut ByteReader::new(&bytes, Endian::Little))
        .unwrap();
    assert_eq!(decoded.mask, ChangeMask::from_bits((1 << 3) | (1 << 8)));
    let named: Vec<(&str, FieldValue)> = decoded
        .fields
        .iter()
        .map(|(index, value)| (Status::SCHEMA.fields()[*index].name, *value))
        .collect();
    assert_eq!(
        named,
        vec![
            ("heading", FieldValue::F64(1.25)),
            ("equipment2", FieldValue::U16(7)),
        ]
    );
}

#[test]
fn schema_kinds_follow_field_types() {
    let kinds: Vec<FieldKind> = Status::SCHEMA.fields().iter().map(|f| f.kind).collect();
    assert_eq!(kinds[3], FieldKind::F64);
    assert_eq!(kinds[6], FieldKind::U8);
    assert_eq!(kinds[12], FieldKind::U16);
    assert_eq!(Status::SCHEMA.full_mask(), ChangeMask::all(13));
}
