//! The canonical ordered collection of visible items.
//!
//! Invariants, held after every operation:
//! - no two items share an id
//! - items are in [`Item::display_order`]
//! - every item is visible
//!
//! Mutations report a [`StoreDelta`] so the cursor can be rebased
//! without re-scanning the collection. No operation fails; an id that is
//! not present is simply "not found".

use live_carousel_types::{Item, ItemId};
use std::collections::HashMap;

/// Structural change produced by a single mutation.
///
/// `removed_at` indexes the sequence *before* the mutation; `inserted_at`
/// indexes the sequence *after* it. An upsert that moved an existing item
/// sets both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreDelta {
    /// Index the new item now occupies.
    pub inserted_at: Option<usize>,
    /// Index the removed item used to occupy.
    pub removed_at: Option<usize>,
}

impl StoreDelta {
    /// A mutation that changed nothing.
    pub const NONE: StoreDelta = StoreDelta {
        inserted_at: None,
        removed_at: None,
    };

    /// An insertion at `index`.
    pub fn inserted(index: usize) -> Self {
        Self {
            inserted_at: Some(index),
            removed_at: None,
        }
    }

    /// A removal from `index`.
    pub fn removed(index: usize) -> Self {
        Self {
            inserted_at: None,
            removed_at: Some(index),
        }
    }

    /// An existing item moved from `from` to `to`.
    pub fn moved(from: usize, to: usize) -> Self {
        Self {
            inserted_at: Some(to),
            removed_at: Some(from),
        }
    }

    /// Whether the mutation left the structure untouched.
    pub fn is_noop(&self) -> bool {
        self.inserted_at.is_none() && self.removed_at.is_none()
    }
}

/// Ordered, deduplicated set of visible items.
#[derive(Debug, Clone, Default)]
pub struct CollectionStore {
    items: Vec<Item>,
}

impl CollectionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection (initial load).
    ///
    /// Drops hidden items, dedupes by id keeping the last occurrence, and
    /// sorts.
    pub fn replace_all(&mut self, items: Vec<Item>) {
        let mut latest: HashMap<ItemId, Item> = HashMap::with_capacity(items.len());
        for item in items {
            latest.insert(item.id.clone(), item);
        }

        let mut items: Vec<Item> = latest.into_values().filter(Item::visible).collect();
        items.sort_by(Item::display_order);
        self.items = items;
    }

    /// Insert or replace `item` by id.
    ///
    /// A hidden item is treated as `remove(item.id)`. Applying the same
    /// upsert twice leaves the store as it was after the first.
    pub fn upsert(&mut self, item: Item) -> StoreDelta {
        if !item.visible() {
            return self.remove(&item.id);
        }

        let removed_at = self.position(&item.id);
        if let Some(index) = removed_at {
            if self.items[index] == item {
                return StoreDelta::NONE;
            }
            self.items.remove(index);
        }

        let inserted_at = self
            .items
            .partition_point(|existing| existing.display_order(&item).is_lt());
        self.items.insert(inserted_at, item);

        StoreDelta {
            inserted_at: Some(inserted_at),
            removed_at,
        }
    }

    /// Remove the item with `id`, if present.
    pub fn remove(&mut self, id: &ItemId) -> StoreDelta {
        match self.position(id) {
            Some(index) => {
                self.items.remove(index);
                StoreDelta::removed(index)
            }
            None => StoreDelta::NONE,
        }
    }

    /// Number of items.
    pub fn size(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item at `index`, if in range.
    pub fn at(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// The item with `id`, if present.
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Index of the item with `id`, if present.
    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    /// All items in display order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use live_carousel_types::ItemStatus;

    fn approved(id: &str, rating: u8, created_at: u64) -> Item {
        Item::new(id, ItemStatus::Approved, rating, created_at)
    }

    fn ids(store: &CollectionStore) -> Vec<&str> {
        store.items().iter().map(|item| item.id.as_str()).collect()
    }

    fn assert_invariants(store: &CollectionStore) {
        let items = store.items();
        for pair in items.windows(2) {
            assert!(
                pair[0].display_order(&pair[1]).is_lt(),
                "out of order or duplicate: {:?} then {:?}",
                pair[0].id,
                pair[1].id
            );
        }
        assert!(items.iter().all(Item::visible));
    }

    #[test]
    fn replace_all_sorts_by_rating_then_recency() {
        let mut store = CollectionStore::new();
        store.replace_all(vec![
            approved("c", 3, 100),
            approved("a", 5, 100),
            approved("b", 4, 100),
            approved("a2", 5, 200),
        ]);

        assert_eq!(ids(&store), vec!["a2", "a", "b", "c"]);
        assert_invariants(&store);
    }

    #[test]
    fn replace_all_dedupes_last_wins() {
        let mut store = CollectionStore::new();
        store.replace_all(vec![approved("a", 1, 0), approved("b", 3, 0), approved("a", 5, 0)]);

        assert_eq!(ids(&store), vec!["a", "b"]);
        assert_eq!(store.at(0).unwrap().rating, 5);
    }

    #[test]
    fn replace_all_drops_hidden_items() {
        let mut store = CollectionStore::new();
        store.replace_all(vec![
            approved("a", 5, 0),
            Item::new("p", ItemStatus::Pending, 5, 0),
        ]);
        assert_eq!(ids(&store), vec!["a"]);
    }

    #[test]
    fn replace_all_with_empty_input_is_empty() {
        let mut store = CollectionStore::new();
        store.replace_all(vec![approved("a", 5, 0)]);
        store.replace_all(Vec::new());
        assert!(store.is_empty());
        assert_eq!(store.size(), 0);
    }

    #[test]
    fn upsert_inserts_in_sorted_position() {
        let mut store = CollectionStore::new();
        store.replace_all(vec![approved("a", 5, 0), approved("c", 3, 0)]);

        let delta = store.upsert(approved("b", 4, 0));

        assert_eq!(delta, StoreDelta::inserted(1));
        assert_eq!(ids(&store), vec!["a", "b", "c"]);
    }

    #[test]
    fn upsert_existing_reports_move() {
        let mut store = CollectionStore::new();
        store.replace_all(vec![approved("a", 5, 0), approved("b", 4, 0), approved("c", 3, 0)]);

        // c jumps to the top
        let delta = store.upsert(approved("c", 5, 10));

        assert_eq!(delta, StoreDelta::moved(2, 0));
        assert_eq!(ids(&store), vec!["c", "a", "b"]);
    }

    #[test]
    fn upsert_payload_change_in_place() {
        let mut store = CollectionStore::new();
        store.replace_all(vec![approved("a", 5, 0), approved("b", 4, 0)]);

        let delta = store.upsert(approved("b", 4, 0).with_field("text", "edited"));

        assert_eq!(delta, StoreDelta::moved(1, 1));
        assert_eq!(
            store.at(1).unwrap().fields.get("text"),
            Some(&serde_json::Value::from("edited"))
        );
    }

    #[test]
    fn upsert_is_idempotent() {
        let mut store = CollectionStore::new();
        store.replace_all(vec![approved("a", 5, 0), approved("c", 3, 0)]);

        store.upsert(approved("b", 4, 0));
        let once: Vec<Item> = store.items().to_vec();
        let delta = store.upsert(approved("b", 4, 0));

        assert!(delta.is_noop());
        assert_eq!(store.items(), once.as_slice());
    }

    #[test]
    fn hidden_upsert_removes() {
        let mut store = CollectionStore::new();
        store.replace_all(vec![approved("a", 5, 0), approved("b", 4, 0)]);

        let delta = store.upsert(Item::new("a", ItemStatus::Rejected, 5, 0));

        assert_eq!(delta, StoreDelta::removed(0));
        assert_eq!(ids(&store), vec!["b"]);
    }

    #[test]
    fn hidden_upsert_of_unknown_id_is_noop() {
        let mut store = CollectionStore::new();
        let delta = store.upsert(Item::new("ghost", ItemStatus::Pending, 5, 0));
        assert!(delta.is_noop());
        assert!(store.is_empty());
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut store = CollectionStore::new();
        store.replace_all(vec![approved("a", 5, 0)]);

        assert_eq!(store.remove(&ItemId::from("zzz")), StoreDelta::NONE);
        assert_eq!(store.remove(&ItemId::from("a")), StoreDelta::removed(0));
        // Duplicate delete
        assert_eq!(store.remove(&ItemId::from("a")), StoreDelta::NONE);
    }

    #[test]
    fn reads_are_bounds_checked() {
        let mut store = CollectionStore::new();
        store.replace_all(vec![approved("a", 5, 0)]);

        assert!(store.at(0).is_some());
        assert!(store.at(1).is_none());
        assert_eq!(store.position(&ItemId::from("a")), Some(0));
        assert!(store.get(&ItemId::from("b")).is_none());
    }

    #[test]
    fn mixed_sequence_keeps_invariants() {
        let mut store = CollectionStore::new();
        let ops: Vec<(&str, u8, u64, bool)> = vec![
            ("a", 3, 1, true),
            ("b", 5, 2, true),
            ("c", 3, 3, true),
            ("a", 5, 4, true),
            ("b", 5, 2, false),
            ("d", 1, 5, true),
            ("c", 4, 3, true),
            ("e", 3, 1, true),
            ("d", 1, 5, false),
            ("a", 5, 4, true),
        ];

        for (id, rating, created_at, visible) in ops {
            let status = if visible {
                ItemStatus::Approved
            } else {
                ItemStatus::Pending
            };
            store.upsert(Item::new(id, status, rating, created_at));
            assert_invariants(&store);
        }

        assert_eq!(ids(&store), vec!["a", "c", "e"]);
    }
}
