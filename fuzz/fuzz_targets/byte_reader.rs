#![no_main]

use bytecodec::{ByteReader, Endian};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&first, rest)) = data.split_first() else {
        return;
    };
    let endian = if first & 1 == 0 { Endian::Little } else { Endian::Big };
    let mut reader = ByteReader::new(rest, endian);
    let mut idx = 0usize;

    // Use input bytes to drive a bounded sequence of operations.
    while idx < rest.len() && idx < 1024 {
        let op = rest[idx] % 8;
        idx += 1;
        let before = reader.position();

        let failed = match op {
            0 => reader.read_u8().is_err(),
            1 => reader.read_u16().is_err(),
            2 => reader.read_u32().is_err(),
            3 => reader.read_f64().is_err(),
            4 => reader.read_bool().is_err(),
            5 => reader.read_string().is_err(),
            6 => reader.read::<Vec<u16>>().is_err(),
            _ => reader.read::<(u8, i32, f32)>().is_err(),
        };

        // A failed fixed-width read never consumes input.
        if failed && op < 4 {
            assert_eq!(reader.position(), before);
        }
        assert!(reader.position() <= rest.len());
    }
});
