//! The snapshot ring and its per-entity recency index.

use std::collections::{BTreeMap, VecDeque};

use bytecodec::{ByteReader, ByteWriter};
use delta::{change_mask, read_delta, write_delta, write_full, DeltaRecord};
use log::{debug, trace, warn};

use crate::{EntityId, HistoryConfig, HistoryError, HistoryResult, Seq, Snapshot, Tick};

/// Where an entity currently lives in a history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    /// Never inserted.
    Unknown,
    /// Changed within the retained window.
    Active,
    /// Last change fell out of the window; the record is cached.
    Stale,
}

/// The kind of packet [`History::serialize`] produces for an acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Every tracked entity with its complete record.
    Full,
    /// Only entities changed after the acknowledgement, as deltas.
    Incremental,
}

/// Summary of a packet applied by [`History::deserialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// Sequence number from the packet header.
    pub seq: Seq,
    /// Tick from the packet header.
    pub tick: Tick,
    /// Number of snapshots the ring advanced to reach `seq`.
    pub advanced: u32,
    /// Number of entity entries applied.
    pub entities: usize,
}

/// A fixed-capacity ring of snapshots with an active/stale entity index.
///
/// The server inserts records and serializes packets relative to a client's
/// last acknowledged sequence; the client deserializes those packets into
/// its own history. Both ends use the same type, usually with different
/// capacities.
///
/// Retained sequence numbers always form a contiguous window ending at
/// [`seq`](Self::seq), at most `capacity` long.
#[derive(Debug, Clone)]
pub struct History<R> {
    config: HistoryConfig,
    slots: Vec<Snapshot<R>>,
    top: usize,
    seq: Seq,
    /// Sequences at which each entity changed, newest first.
    active: BTreeMap<EntityId, VecDeque<Seq>>,
    /// Record of an active entity before its oldest retained change.
    floor: BTreeMap<EntityId, R>,
    stale: BTreeMap<EntityId, R>,
}

impl<R: DeltaRecord> History<R> {
    /// Creates a history holding one empty snapshot at sequence 0, tick 0.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        let mut slots = Vec::with_capacity(config.capacity.get());
        slots.push(Snapshot::new(Seq::new(0), Tick::new(0)));
        Self {
            config,
            slots,
            top: 0,
            seq: Seq::new(0),
            active: BTreeMap::new(),
            floor: BTreeMap::new(),
            stale: BTreeMap::new(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Returns the ring capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.config.capacity.get()
    }

    /// Returns the current (newest) sequence number.
    #[must_use]
    pub const fn seq(&self) -> Seq {
        self.seq
    }

    /// Returns the tick of the newest snapshot.
    #[must_use]
    pub fn tick(&self) -> Tick {
        self.slots[self.top].tick()
    }

    /// Returns the number of retained snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always `false`: a history retains at least its current snapshot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the oldest retained sequence number.
    #[must_use]
    pub fn oldest_seq(&self) -> Seq {
        Seq::new(self.seq.raw() - self.window_span())
    }

    /// Starts a new snapshot at the next sequence number.
    ///
    /// Once the ring is full the oldest slot is reused: entities whose last
    /// retained change lived there are demoted to the stale cache first.
    pub fn add_snapshot(&mut self, tick: Tick) {
        let next = self.seq.next();
        let capacity = self.capacity();
        if self.slots.len() < capacity {
            self.slots.push(Snapshot::new(next, tick));
            self.top = self.slots.len() - 1;
        } else {
            let index = (self.top + 1) % capacity;
            self.evict(index);
            self.slots[index].reset(next, tick);
            self.top = index;
        }
        self.seq = next;
        debug!(
            "history advanced to {} (tick {}), {} active, {} stale",
            next,
            tick.raw(),
            self.active.len(),
            self.stale.len()
        );
    }

    /// Records `record` as the state of `id` at the current sequence.
    ///
    /// A stale entity becomes active again. Inserting the same id twice in
    /// one sequence replaces the record.
    pub fn insert(&mut self, id: EntityId, record: R) {
        let seq = self.seq;
        if let Some(previous) = self.stale.remove(&id) {
            self.floor.insert(id, previous);
        }
        let changes = self.active.entry(id).or_default();
        if changes.front() != Some(&seq) {
            changes.push_front(seq);
        }
        self.slots[self.top].insert(id, record);
    }

    /// Inserts `record` only if it differs from the latest known state.
    ///
    /// Returns `true` if the record was inserted. Unknown entities are
    /// always inserted.
    pub fn observe(&mut self, id: EntityId, record: R) -> bool {
        let changed = self
            .status(id)
            .map_or(true, |current| !change_mask(&record, current).is_empty());
        if changed {
            self.insert(id, record);
        }
        changed
    }

    /// Returns the snapshot at `seq`.
    pub fn snapshot(&self, seq: Seq) -> HistoryResult<&Snapshot<R>> {
        self.slot(seq).ok_or_else(|| self.out_of_window(seq))
    }

    /// Returns the latest known record of `id`.
    ///
    /// That is the record at the newest active change, else the stale
    /// record, else `None`.
    #[must_use]
    pub fn status(&self, id: EntityId) -> Option<&R> {
        if let Some(&newest) = self.active.get(&id).and_then(VecDeque::front) {
            return self.slot(newest).and_then(|slot| slot.get(id));
        }
        self.stale.get(&id)
    }

    /// Returns the record of `id` as of sequence `seq`.
    ///
    /// Uses the latest retained change at or before `seq`, falling back to the
    /// last record from before the window (the stale record for a stale
    /// entity). A `seq` newer than the current sequence behaves like the
    /// current sequence.
    pub fn status_at(&self, id: EntityId, seq: Seq) -> HistoryResult<Option<&R>> {
        if seq < self.oldest_seq() {
            return Err(self.out_of_window(seq));
        }
        if let Some(changes) = self.active.get(&id) {
            if let Some(&at) = changes.iter().find(|&&change| change <= seq) {
                return Ok(self.slot(at).and_then(|slot| slot.get(id)));
            }
            return Ok(self.floor.get(&id));
        }
        Ok(self.stale.get(&id))
    }

    /// Returns whether `id` is unknown, active or stale.
    #[must_use]
    pub fn entity_state(&self, id: EntityId) -> EntityState {
        if self.active.contains_key(&id) {
            EntityState::Active
        } else if self.stale.contains_key(&id) {
            EntityState::Stale
        } else {
            EntityState::Unknown
        }
    }

    /// Iterates over active ids in ascending order.
    pub fn active_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.active.keys().copied()
    }

    /// Iterates over stale ids in ascending order.
    pub fn stale_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.stale.keys().copied()
    }

    /// Iterates over the retained sequences at which `id` changed, newest first.
    pub fn change_sequences(&self, id: EntityId) -> impl Iterator<Item = Seq> + '_ {
        self.active.get(&id).into_iter().flatten().copied()
    }

    /// Reports the packet kind [`serialize`](Self::serialize) would produce.
    #[must_use]
    pub fn mode_for(&self, last_ack: Seq) -> SyncMode {
        if self.ack_expired(last_ack) {
            SyncMode::Full
        } else {
            SyncMode::Incremental
        }
    }

    /// Writes an update packet for a receiver that acknowledged `last_ack`.
    ///
    /// The packet header is the current sequence and tick. An incremental
    /// packet carries one delta per entity changed after `last_ack`; a full
    /// packet, used once `last_ack` is a capacity or more behind, carries
    /// every tracked entity in full.
    #[must_use]
    pub fn serialize(&self, last_ack: Seq) -> ByteWriter {
        let mut writer = ByteWriter::new(self.config.endian);
        writer.write_u32(self.seq.raw());
        writer.write_u32(self.tick().raw());

        match self.mode_for(last_ack) {
            SyncMode::Full => {
                let mut ids: Vec<EntityId> =
                    self.active_ids().chain(self.stale_ids()).collect();
                ids.sort_unstable();
                debug!(
                    "full packet {} for ack {}: {} entities",
                    self.seq,
                    last_ack,
                    ids.len()
                );
                for id in ids {
                    if let Some(record) = self.status(id) {
                        writer.write_u32(id.raw());
                        write_full(&mut writer, record);
                    }
                }
            }
            SyncMode::Incremental => {
                for (&id, changes) in &self.active {
                    let Some(&newest) = changes.front() else {
                        continue;
                    };
                    if newest <= last_ack {
                        continue;
                    }
                    let Some(current) = self.slot(newest).and_then(|slot| slot.get(id)) else {
                        continue;
                    };
                    writer.write_u32(id.raw());
                    let baseline = self.status_at(id, last_ack).ok().flatten();
                    let mask = match baseline {
                        Some(baseline) => write_delta(&mut writer, current, baseline),
                        None => write_full(&mut writer, current),
                    };
                    trace!("entity {} changed at {}, mask {}", id.raw(), newest, mask);
                }
            }
        }
        writer
    }

    /// Applies an update packet produced by a peer's [`serialize`](Self::serialize).
    ///
    /// `last_ack` must be the acknowledgement the sender diffed against. The
    /// ring advances to the packet's sequence, then every entry is applied
    /// onto the receiver's state as of `last_ack` and inserted at the new
    /// sequence. A packet at the current sequence is applied again.
    ///
    /// The packet is fully decoded before anything changes, so on error the
    /// history is left untouched.
    pub fn deserialize(
        &mut self,
        reader: &mut ByteReader<'_>,
        last_ack: Seq,
    ) -> HistoryResult<Applied> {
        if self.ack_expired(last_ack) {
            warn!(
                "dropping packet: ack {} is too old for history at {} (capacity {})",
                last_ack,
                self.seq,
                self.capacity()
            );
            return Err(HistoryError::UnusablePacket {
                last_ack,
                current: self.seq,
                capacity: self.capacity(),
            });
        }

        let seq = Seq::new(reader.read_u32()?);
        let tick = Tick::new(reader.read_u32()?);
        if seq < self.seq {
            debug!("dropping stale packet {}, history at {}", seq, self.seq);
            return Err(HistoryError::StalePacket {
                received: seq,
                current: self.seq,
            });
        }

        // Entries are decoded against the window the sender's ack refers to,
        // before the ring moves.
        let limit = self.config.max_entities_per_packet;
        let mut staged = Vec::new();
        while !reader.is_empty() {
            if staged.len() == limit {
                return Err(HistoryError::TooManyEntities { limit });
            }
            let id = EntityId::new(reader.read_u32()?);
            let mut record = self
                .status_at(id, last_ack)
                .ok()
                .flatten()
                .or_else(|| self.status(id))
                .cloned()
                .unwrap_or_default();
            let mask = read_delta(reader, &mut record)?;
            trace!("entity {} updated at {}, mask {}", id.raw(), seq, mask);
            staged.push((id, record));
        }

        let advanced = seq.raw() - self.seq.raw();
        self.advance_to(seq);
        self.slots[self.top].set_tick(tick);
        let entities = staged.len();
        for (id, record) in staged {
            self.insert(id, record);
        }

        Ok(Applied {
            seq,
            tick,
            advanced,
            entities,
        })
    }

    fn ack_expired(&self, last_ack: Seq) -> bool {
        u64::from(last_ack.raw()) + self.capacity() as u64 <= u64::from(self.seq.raw())
    }

    /// Distance from the oldest retained sequence to the current one.
    fn window_span(&self) -> u32 {
        // The ring never holds more than `seq + 1` slots.
        u32::try_from(self.slots.len() - 1).unwrap_or(u32::MAX)
    }

    fn slot(&self, seq: Seq) -> Option<&Snapshot<R>> {
        if seq > self.seq || seq < self.oldest_seq() {
            return None;
        }
        let back = (self.seq.raw() - seq.raw()) as usize;
        let len = self.slots.len();
        Some(&self.slots[(self.top + len - back) % len])
    }

    fn out_of_window(&self, seq: Seq) -> HistoryError {
        HistoryError::SequenceOutOfWindow {
            requested: seq,
            oldest: self.oldest_seq(),
            newest: self.seq,
        }
    }

    /// Moves the records of the slot at `index` out of the active index.
    ///
    /// Entities whose oldest retained change is this slot lose it and keep
    /// the record as their floor; those left with no retained change move to
    /// the stale cache with this record.
    fn evict(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        let evicted = slot.seq();
        for (id, record) in slot.drain() {
            let Some(changes) = self.active.get_mut(&id) else {
                continue;
            };
            if changes.back().is_some_and(|&oldest| oldest <= evicted) {
                changes.pop_back();
            }
            if changes.is_empty() {
                self.active.remove(&id);
                self.floor.remove(&id);
                trace!("entity {} demoted to stale at {}", id.raw(), evicted);
                self.stale.insert(id, record);
            } else {
                self.floor.insert(id, record);
            }
        }
    }

    /// Advances the ring until the current sequence is `seq`.
    ///
    /// Gap snapshots take the previous top tick plus one per step.
    fn advance_to(&mut self, seq: Seq) {
        let gap = seq.raw() - self.seq.raw();
        if gap as usize >= self.capacity() {
            self.jump_to(seq);
            return;
        }
        while self.seq < seq {
            let tick = self.tick().offset(1);
            self.add_snapshot(tick);
        }
    }

    /// Advances past the whole window at once.
    ///
    /// Equivalent to stepping `add_snapshot` when every retained slot would be
    /// evicted anyway, without iterating over the gap.
    fn jump_to(&mut self, seq: Seq) {
        let len = self.slots.len();
        for step in 1..=len {
            self.evict((self.top + step) % len);
        }

        let base_seq = self.seq.raw();
        let base_tick = self.tick();
        let capacity = self.capacity();
        while self.slots.len() < capacity {
            self.slots.push(Snapshot::new(Seq::new(0), Tick::new(0)));
        }
        let len = self.slots.len();
        // Slot `i` holds `seq - (len - 1 - i)`.
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let at = seq.raw() - (len - 1 - i) as u32;
            slot.reset(Seq::new(at), base_tick.offset(at - base_seq));
        }
        self.top = len - 1;
        self.seq = seq;
        debug!("history jumped to {} past a gap of {}", seq, seq.raw() - base_seq);
    }
}
