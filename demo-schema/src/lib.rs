//! Reference record and history settings for the demo simulation.

use std::num::NonZeroUsize;

use delta::{delta_record, DeltaRecord, Schema};
use history::{HistoryConfig, CLIENT_CAPACITY, SERVER_CAPACITY};

delta_record! {
    /// Replicated state of one creature.
    ///
    /// Positions and heading change most ticks; animation changes often;
    /// faction and equipment almost never.
    pub struct CreatureStatus {
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

/// Snapshots retained by the demo server.
pub const SERVER_SNAPSHOTS: NonZeroUsize = SERVER_CAPACITY;

/// Snapshots retained by the demo client.
pub const CLIENT_SNAPSHOTS: NonZeroUsize = CLIENT_CAPACITY;

/// Returns the schema of [`CreatureStatus`].
pub const fn creature_schema() -> Schema {
    CreatureStatus::SCHEMA
}

/// History configuration for the demo server.
pub const fn server_config() -> HistoryConfig {
    HistoryConfig::server().with_capacity(SERVER_SNAPSHOTS)
}

/// History configuration for the demo client.
pub const fn client_config() -> HistoryConfig {
    HistoryConfig::client().with_capacity(CLIENT_SNAPSHOTS)
}

impl CreatureStatus {
    /// Returns the equipment slots in order.
    pub const fn equipment(&self) -> [u16; 6] {
        [
            self.equipment1,
            self.equipment2,
            self.equipment3,
            self.equipment4,
            self.equipment5,
            self.equipment6,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delta::FieldKind;

    #[test]
    fn creature_schema_layout() {
        let schema = creature_schema();
        assert_eq!(schema.name(), "CreatureStatus");
        assert_eq!(schema.len(), 13);
        assert_eq!(schema.fields()[3].name, "heading");
        assert_eq!(schema.fields()[3].kind, FieldKind::F64);
        assert_eq!(schema.fields()[12].name, "equipment6");
        // 3 * f32 + f64 + 3 * u8 + 6 * u16
        assert_eq!(schema.full_len(), 35);
    }

    #[test]
    fn capacities() {
        assert_eq!(server_config().capacity.get(), 64);
        assert_eq!(client_config().capacity.get(), 3);
    }

    #[test]
    fn fingerprint_is_stable_across_calls() {
        assert_eq!(creature_schema().fingerprint(), CreatureStatus::SCHEMA.fingerprint());
    }

    #[test]
    fn equipment_slots_in_order() {
        let creature = CreatureStatus {
            equipment1: 1,
            equipment6: 6,
            ..CreatureStatus::default()
        };
        assert_eq!(creature.equipment(), [1, 0, 0, 0, 0, 6]);
    }
}
