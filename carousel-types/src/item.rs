//! The displayed record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

use crate::ItemId;

/// Moderation status of an item, as assigned by the backend.
///
/// Only approved items are shown in the carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Accepted for display.
    Approved,
    /// Awaiting moderation.
    #[default]
    Pending,
    /// Rejected by moderation.
    Rejected,
    /// A status this version does not know about. Never visible.
    #[serde(other)]
    Unknown,
}

/// One unit of displayed content.
///
/// Identity is [`Item::id`]. The status, rating and creation time drive
/// visibility and ordering; everything else the backend sent is kept in
/// [`Item::fields`] untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Stable unique identifier.
    pub id: ItemId,
    /// Moderation status (visibility).
    #[serde(default)]
    pub status: ItemStatus,
    /// Star rating; higher sorts first.
    #[serde(default)]
    pub rating: u8,
    /// Creation time in unix seconds; newer sorts first among equal ratings.
    #[serde(default)]
    pub created_at: u64,
    /// Opaque payload (author, text, avatar, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Item {
    /// Create an item with an empty payload.
    pub fn new(id: impl Into<ItemId>, status: ItemStatus, rating: u8, created_at: u64) -> Self {
        Self {
            id: id.into(),
            status,
            rating,
            created_at,
            fields: Map::new(),
        }
    }

    /// Attach an opaque payload field.
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Whether this item belongs in the carousel at all.
    pub fn visible(&self) -> bool {
        self.status == ItemStatus::Approved
    }

    /// Display order: rating descending, then newest first, then id.
    ///
    /// `Ordering::Less` means `self` is shown before `other`. The id
    /// tie-break makes the order total.
    pub fn display_order(&self, other: &Item) -> Ordering {
        other
            .rating
            .cmp(&self.rating)
            .then_with(|| other.created_at.cmp(&self.created_at))
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_approved_is_visible() {
        assert!(Item::new("a", ItemStatus::Approved, 5, 0).visible());
        assert!(!Item::new("a", ItemStatus::Pending, 5, 0).visible());
        assert!(!Item::new("a", ItemStatus::Rejected, 5, 0).visible());
        assert!(!Item::new("a", ItemStatus::Unknown, 5, 0).visible());
    }

    #[test]
    fn higher_rating_sorts_first() {
        let high = Item::new("b", ItemStatus::Approved, 5, 10);
        let low = Item::new("a", ItemStatus::Approved, 3, 99);
        assert_eq!(high.display_order(&low), Ordering::Less);
        assert_eq!(low.display_order(&high), Ordering::Greater);
    }

    #[test]
    fn newer_sorts_first_among_equal_ratings() {
        let newer = Item::new("a", ItemStatus::Approved, 4, 200);
        let older = Item::new("b", ItemStatus::Approved, 4, 100);
        assert_eq!(newer.display_order(&older), Ordering::Less);
    }

    #[test]
    fn id_breaks_remaining_ties() {
        let a = Item::new("a", ItemStatus::Approved, 4, 100);
        let b = Item::new("b", ItemStatus::Approved, 4, 100);
        assert_eq!(a.display_order(&b), Ordering::Less);
        assert_eq!(a.display_order(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn deserializes_backend_record_with_payload() {
        let json = r#"{
            "id": "r1",
            "status": "approved",
            "rating": 5,
            "created_at": 1700000000,
            "author": "Dana",
            "text": "Great service"
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();

        assert_eq!(item.id, ItemId::from("r1"));
        assert!(item.visible());
        assert_eq!(item.rating, 5);
        assert_eq!(item.fields.get("author"), Some(&Value::from("Dana")));
        assert_eq!(item.fields.len(), 2);
    }

    #[test]
    fn unknown_status_is_tolerated() {
        let json = r#"{"id": "r1", "status": "archived"}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.status, ItemStatus::Unknown);
        assert!(!item.visible());
    }

    #[test]
    fn missing_status_defaults_to_hidden() {
        let item: Item = serde_json::from_str(r#"{"id": "r1"}"#).unwrap();
        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(item.rating, 0);
    }
}
