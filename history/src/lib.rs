//! Sequence-indexed snapshot history for snapsync.
//!
//! A [`History`] is a fixed-capacity ring of [`Snapshot`]s. Each snapshot
//! holds the records of the entities that changed at its sequence number.
//! The history keeps, per entity, the retained sequences at which it changed
//! (the *active* index) and caches the last record of entities whose changes
//! all fell out of the window (the *stale* index).
//!
//! The authoritative side inserts records every tick and writes update
//! packets relative to each receiver's last acknowledged sequence:
//!
//! ```text
//! u32 sequence
//! u32 tick
//! repeated {
//!   u32 entity_id
//!   u16 change_mask
//!   <field bytes for each set bit, ascending field order>
//! }
//! ```
//!
//! A receiver less than `capacity` sequences behind gets an incremental
//! packet holding only entities changed since its acknowledgement. A receiver
//! further behind gets a full packet with every tracked entity.
//!
//! # Example
//!
//! ```
//! use bytecodec::ByteReader;
//! use delta::delta_record;
//! use history::{EntityId, History, HistoryConfig, Seq, Tick};
//!
//! delta_record! {
//!     pub struct Marker {
//!         pub x: f32,
//!         pub team: u8,
//!     }
//! }
//!
//! let mut server = History::new(HistoryConfig::server());
//! let mut client = History::new(HistoryConfig::client());
//!
//! server.add_snapshot(Tick::new(1));
//! server.insert(EntityId::new(7), Marker { x: 2.5, team: 1 });
//!
//! let packet = server.serialize(Seq::new(0)).finish();
//! let mut reader = ByteReader::new(&packet, server.config().endian);
//! client.deserialize(&mut reader, Seq::new(0)).unwrap();
//!
//! assert_eq!(client.seq(), Seq::new(1));
//! assert_eq!(client.status(EntityId::new(7)), Some(&Marker { x: 2.5, team: 1 }));
//! ```
//!
//! # Design Principles
//!
//! - **Bounded memory** - The ring is pre-sized; slots are cleared and reused
//!   in place.
//! - **Deterministic** - Entities are written in ascending id order.
//! - **Typed failures** - Unusable, stale and malformed packets are reported
//!   as [`HistoryError`]s and logged through the `log` facade.

mod config;
mod error;
mod history;
mod snapshot;
mod types;

pub use bytecodec::Endian;
pub use config::{HistoryConfig, CLIENT_CAPACITY, SERVER_CAPACITY};
pub use error::{HistoryError, HistoryResult};
pub use history::{Applied, EntityState, History, SyncMode};
pub use snapshot::Snapshot;
pub use types::{EntityId, Seq, Tick};
