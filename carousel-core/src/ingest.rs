//! Applying push-channel events to the collection.
//!
//! The channel may duplicate, drop or reorder messages. Every event maps
//! onto an idempotent store operation, so replaying or reordering them
//! never corrupts the collection:
//!
//! | Event          | Store operation                        |
//! |----------------|----------------------------------------|
//! | `Created(item)`| `upsert` if visible, otherwise dropped |
//! | `Updated(item)`| `upsert` (hides → remove)              |
//! | `Deleted(id)`  | `remove`                               |
//!
//! The cursor is rebased synchronously after each applied event; nothing
//! is buffered.

use live_carousel_types::{ChannelMessage, DecodeError, ItemEvent};

use crate::cursor::CursorController;
use crate::store::{CollectionStore, StoreDelta};

/// What applying one event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Structural change to the collection.
    pub delta: StoreDelta,
    /// Whether rebasing changed the cursor value.
    pub cursor_moved: bool,
}

impl IngestOutcome {
    const UNCHANGED: IngestOutcome = IngestOutcome {
        delta: StoreDelta::NONE,
        cursor_moved: false,
    };
}

/// Counters for ingested traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Events that changed the collection.
    pub applied: u64,
    /// Well-formed events that changed nothing (duplicates, unknown ids,
    /// hidden creations).
    pub unchanged: u64,
    /// Messages that could not be decoded.
    pub malformed: u64,
}

/// Translates channel events into store operations.
#[derive(Debug, Clone, Default)]
pub struct IngestionAdapter {
    stats: IngestStats,
}

impl IngestionAdapter {
    /// Create an adapter with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one typed event and rebase the cursor.
    pub fn apply(
        &mut self,
        event: ItemEvent,
        store: &mut CollectionStore,
        cursor: &mut CursorController,
    ) -> IngestOutcome {
        let delta = match event {
            ItemEvent::Created(item) if !item.visible() => StoreDelta::NONE,
            ItemEvent::Created(item) | ItemEvent::Updated(item) => store.upsert(item),
            ItemEvent::Deleted(id) => store.remove(&id),
        };

        if delta.is_noop() {
            self.stats.unchanged += 1;
            return IngestOutcome::UNCHANGED;
        }

        self.stats.applied += 1;
        let cursor_moved = cursor.on_store_mutated(delta, store.size());
        IngestOutcome {
            delta,
            cursor_moved,
        }
    }

    /// Decode and apply a raw channel message.
    ///
    /// # Errors
    ///
    /// Returns the decode error for malformed or unknown messages; the
    /// store and cursor are untouched in that case.
    pub fn apply_message(
        &mut self,
        message: ChannelMessage,
        store: &mut CollectionStore,
        cursor: &mut CursorController,
    ) -> Result<IngestOutcome, DecodeError> {
        match ItemEvent::try_from(message) {
            Ok(event) => Ok(self.apply(event, store, cursor)),
            Err(e) => {
                self.stats.malformed += 1;
                Err(e)
            }
        }
    }

    /// Traffic counters so far.
    pub fn stats(&self) -> IngestStats {
        self.stats
    }
}
