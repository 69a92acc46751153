use bytecodec::ByteReader;
use delta::delta_record;
use history::{EntityId, EntityState, History, HistoryConfig, HistoryError, Seq, SyncMode, Tick};

delta_record! {
    struct Creature {
        x: f32,
        y: f32,
        anim: u8,
        equipment: u16,
    }
}

fn creature(x: f32) -> Creature {
    Creature {
        x,
        y: -x,
        anim: 1,
        equipment: 300,
    }
}

fn advance(history: &mut History<Creature>, ticks: u32) {
    for _ in 0..ticks {
        let tick = Tick::new(history.tick().raw() + 1);
        history.add_snapshot(tick);
    }
}

/// Reads the entity ids of a packet written for `Creature`.
fn packet_ids(bytes: &[u8], config: &HistoryConfig) -> (u32, Vec<(u32, u16)>) {
    let mut reader = ByteReader::new(bytes, config.endian);
    let seq = reader.read_u32().unwrap();
    let _tick = reader.read_u32().unwrap();
    let mut entries = Vec::new();
    while !reader.is_empty() {
        let id = reader.read_u32().unwrap();
        let mut scratch = Creature::default();
        let mask = delta::read_delta(&mut reader, &mut scratch).unwrap();
        entries.push((id, mask.bits()));
    }
    (seq, entries)
}

#[test]
fn entity_goes_stale_but_keeps_status() {
    let mut history = History::new(HistoryConfig::client());
    advance(&mut history, 1);
    history.insert(EntityId::new(7), creature(7.0));
    advance(&mut history, 3);

    assert_eq!(history.seq(), Seq::new(4));
    assert_eq!(history.entity_state(EntityId::new(7)), EntityState::Stale);
    assert_eq!(history.status(EntityId::new(7)), Some(&creature(7.0)));
}

#[test]
fn recent_ack_gets_incremental_packet() {
    let config = HistoryConfig::server();
    let mut history = History::new(config.clone());
    for step in 1..=5u32 {
        advance(&mut history, 1);
        // Entity 1 moves every tick, entity 2 only once, entity 3 never after seq 1.
        history.insert(EntityId::new(1), creature(step as f32));
        if step == 1 {
            history.insert(EntityId::new(3), creature(3.0));
        }
        if step == 4 {
            history.insert(EntityId::new(2), creature(2.0));
        }
    }
    assert_eq!(history.mode_for(Seq::new(0)), SyncMode::Incremental);

    let bytes = history.serialize(Seq::new(0)).finish();
    let (seq, entries) = packet_ids(&bytes, &config);
    assert_eq!(seq, 5);
    let ids: Vec<u32> = entries.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    // Against ack 4, only entity 1 changed.
    let bytes = history.serialize(Seq::new(4)).finish();
    let (_, entries) = packet_ids(&bytes, &config);
    assert_eq!(entries, vec![(1, 0b11)]);
}

#[test]
fn old_ack_gets_full_packet() {
    let config = HistoryConfig::server();
    let mut history = History::new(config.clone());
    advance(&mut history, 1);
    history.insert(EntityId::new(10), creature(1.0));
    history.insert(EntityId::new(4), creature(2.0));
    advance(&mut history, 68);
    history.insert(EntityId::new(10), creature(5.0));
    advance(&mut history, 1);

    assert_eq!(history.seq(), Seq::new(70));
    assert_eq!(history.entity_state(EntityId::new(4)), EntityState::Stale);
    assert_eq!(history.mode_for(Seq::new(0)), SyncMode::Full);

    let bytes = history.serialize(Seq::new(0)).finish();
    let (seq, entries) = packet_ids(&bytes, &config);
    assert_eq!(seq, 70);
    assert_eq!(entries, vec![(4, 0b1111), (10, 0b1111)]);
}

#[test]
fn full_packet_rebuilds_a_fresh_client() {
    let mut server = History::new(HistoryConfig::server());
    advance(&mut server, 1);
    for raw in 0..5 {
        server.insert(EntityId::new(raw), creature(raw as f32));
    }
    advance(&mut server, 80);

    let bytes = server.serialize(Seq::new(0)).finish();
    let mut client = History::new(HistoryConfig::client());
    let applied = client
        .deserialize(&mut ByteReader::new(&bytes, client.config().endian), Seq::new(0))
        .unwrap();
    assert_eq!(applied.entities, 5);
    for raw in 0..5 {
        let id = EntityId::new(raw);
        assert_eq!(client.status(id), server.status(id));
        assert_eq!(client.entity_state(id), EntityState::Active);
    }
}

#[test]
fn capacity_bounds_retained_snapshots() {
    let mut history: History<Creature> = History::new(HistoryConfig::client());
    for _ in 0..10 {
        advance(&mut history, 1);
        assert!(history.len() <= history.capacity());
    }
    assert!(matches!(
        history.snapshot(Seq::new(7)),
        Err(HistoryError::SequenceOutOfWindow { .. })
    ));
    assert!(history.snapshot(Seq::new(8)).is_ok());
    assert!(history.snapshot(Seq::new(10)).is_ok());
}

#[test]
fn client_drops_packet_for_expired_ack() {
    let mut server = History::new(HistoryConfig::server());
    let mut client: History<Creature> = History::new(HistoryConfig::client());
    advance(&mut server, 5);
    advance(&mut client, 4);

    let bytes = server.serialize(Seq::new(1)).finish();
    let err = client
        .deserialize(&mut ByteReader::new(&bytes, client.config().endian), Seq::new(1))
        .unwrap_err();
    assert!(matches!(err, HistoryError::UnusablePacket { .. }));
}
