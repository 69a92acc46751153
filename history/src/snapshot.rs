//! A single retained snapshot.

use std::collections::HashMap;

use crate::{EntityId, Seq, Tick};

/// The state of every entity that changed at one sequence number.
///
/// Entities that did not change at this sequence are absent; their state
/// lives in an older snapshot or in the stale cache of the owning history.
#[derive(Debug, Clone)]
pub struct Snapshot<R> {
    seq: Seq,
    tick: Tick,
    records: HashMap<EntityId, R>,
}

impl<R> Snapshot<R> {
    pub(crate) fn new(seq: Seq, tick: Tick) -> Self {
        Self {
            seq,
            tick,
            records: HashMap::new(),
        }
    }

    /// Returns the sequence number.
    #[must_use]
    pub const fn seq(&self) -> Seq {
        self.seq
    }

    /// Returns the simulation tick.
    #[must_use]
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    /// Returns the record stored for `id`.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&R> {
        self.records.get(&id)
    }

    /// Returns `true` if `id` changed at this sequence.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.records.contains_key(&id)
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no entity changed at this sequence.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the stored ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.records.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterates over stored records in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &R)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    pub(crate) fn insert(&mut self, id: EntityId, record: R) {
        self.records.insert(id, record);
    }

    pub(crate) fn set_tick(&mut self, tick: Tick) {
        self.tick = tick;
    }

    /// Moves every record out, keeping the table's allocation.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (EntityId, R)> + '_ {
        self.records.drain()
    }

    /// Relabels an emptied slot for reuse.
    pub(crate) fn reset(&mut self, seq: Seq, tick: Tick) {
        self.records.clear();
        self.seq = seq;
        self.tick = tick;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut snapshot = Snapshot::new(Seq::new(3), Tick::new(30));
        snapshot.insert(EntityId::new(2), 20u8);
        snapshot.insert(EntityId::new(1), 10u8);

        assert_eq!(snapshot.seq(), Seq::new(3));
        assert_eq!(snapshot.tick(), Tick::new(30));
        assert_eq!(snapshot.get(EntityId::new(1)), Some(&10));
        assert!(snapshot.contains(EntityId::new(2)));
        assert!(!snapshot.contains(EntityId::new(3)));
        assert_eq!(snapshot.ids(), vec![EntityId::new(1), EntityId::new(2)]);
    }

    #[test]
    fn insert_replaces() {
        let mut snapshot = Snapshot::new(Seq::new(0), Tick::new(0));
        snapshot.insert(EntityId::new(1), 1u8);
        snapshot.insert(EntityId::new(1), 2u8);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(EntityId::new(1)), Some(&2));
    }

    #[test]
    fn drain_then_reset() {
        let mut snapshot = Snapshot::new(Seq::new(0), Tick::new(0));
        snapshot.insert(EntityId::new(1), 1u8);
        snapshot.insert(EntityId::new(2), 2u8);

        let mut drained: Vec<(EntityId, u8)> = snapshot.drain().collect();
        drained.sort_unstable();
        assert_eq!(drained, vec![(EntityId::new(1), 1), (EntityId::new(2), 2)]);
        assert!(snapshot.is_empty());

        snapshot.reset(Seq::new(5), Tick::new(50));
        assert_eq!(snapshot.seq(), Seq::new(5));
        assert_eq!(snapshot.tick(), Tick::new(50));
    }
}
