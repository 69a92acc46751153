#![no_main]

use bytecodec::ByteReader;
use delta::delta_record;
use history::{EntityId, History, HistoryConfig, Seq};
use libfuzzer_sys::fuzz_target;

delta_record! {
    struct Probe {
        x: f32,
        heading: f64,
        anim: u8,
        gear: u16,
    }
}

fuzz_target!(|data: &[u8]| {
    let mut client: History<Probe> = History::new(HistoryConfig::client());
    let mut idx = 0usize;

    // Split the input into frames; the first byte of each picks the ack.
    while idx < data.len() && idx < 8192 {
        let len = (data[idx] as usize % 200).saturating_add(1);
        let ack = Seq::new(client.seq().raw().saturating_sub(u32::from(data[idx] % 4)));
        idx += 1;
        let end = (idx + len).min(data.len());
        let frame = &data[idx..end];
        idx = end;

        let before = client.seq();
        let mut reader = ByteReader::new(frame, client.config().endian);
        match client.deserialize(&mut reader, ack) {
            Ok(applied) => assert_eq!(client.seq(), applied.seq),
            Err(_) => assert_eq!(client.seq(), before),
        }

        assert!(client.len() <= client.capacity());
        for id in client.active_ids().chain(client.stale_ids()) {
            assert!(client.status(id).is_some());
        }
        let _ = client.status(EntityId::new(0));
    }
});
