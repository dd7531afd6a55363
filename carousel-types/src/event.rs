//! Inbound change events.
//!
//! The push channel delivers loosely-shaped [`ChannelMessage`]s. They are
//! turned into typed [`ItemEvent`]s at the boundary so the rest of the
//! carousel only ever sees one of three well-formed variants.

use serde::{Deserialize, Serialize};

use crate::{DecodeError, Item, ItemId};

/// A message as it arrives on the push channel.
///
/// `kind` is one of `created`, `updated`, `deleted` (the `insert`,
/// `update`, `delete` spellings are accepted too, case-insensitively).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// Event discriminator.
    pub kind: String,
    /// The full record, for created/updated events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
    /// The record id, for deleted events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
}

impl ChannelMessage {
    /// Parse a channel message from JSON text.
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(json).map_err(DecodeError::InvalidJson)
    }

    /// Build a `created` message.
    pub fn created(item: Item) -> Self {
        Self {
            kind: "created".into(),
            item: Some(item),
            id: None,
        }
    }

    /// Build an `updated` message.
    pub fn updated(item: Item) -> Self {
        Self {
            kind: "updated".into(),
            item: Some(item),
            id: None,
        }
    }

    /// Build a `deleted` message.
    pub fn deleted(id: impl Into<ItemId>) -> Self {
        Self {
            kind: "deleted".into(),
            item: None,
            id: Some(id.into()),
        }
    }
}

/// A typed change to the item collection.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemEvent {
    /// A new item was created.
    Created(Item),
    /// An existing item changed (possibly its visibility).
    Updated(Item),
    /// An item was deleted.
    Deleted(ItemId),
}

impl ItemEvent {
    /// Decode JSON text straight into a typed event.
    pub fn decode(json: &str) -> Result<Self, DecodeError> {
        ChannelMessage::from_json(json)?.try_into()
    }

    /// The id this event refers to.
    pub fn id(&self) -> &ItemId {
        match self {
            Self::Created(item) | Self::Updated(item) => &item.id,
            Self::Deleted(id) => id,
        }
    }

    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
            Self::Deleted(_) => "deleted",
        }
    }
}

impl TryFrom<ChannelMessage> for ItemEvent {
    type Error = DecodeError;

    fn try_from(msg: ChannelMessage) -> Result<Self, Self::Error> {
        match msg.kind.to_ascii_lowercase().as_str() {
            "created" | "insert" => msg
                .item
                .map(Self::Created)
                .ok_or(DecodeError::MissingItem { kind: "created" }),
            "updated" | "update" => msg
                .item
                .map(Self::Updated)
                .ok_or(DecodeError::MissingItem { kind: "updated" }),
            "deleted" | "delete" => msg
                .id
                .or_else(|| msg.item.map(|item| item.id))
                .map(Self::Deleted)
                .ok_or(DecodeError::MissingId),
            _ => Err(DecodeError::UnknownKind(msg.kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ItemStatus;

    #[test]
    fn decodes_created() {
        let json = r#"{"kind":"created","item":{"id":"a","status":"approved","rating":5}}"#;
        let event = ItemEvent::decode(json).unwrap();
        match event {
            ItemEvent::Created(item) => {
                assert_eq!(item.id, ItemId::from("a"));
                assert!(item.visible());
            }
            other => panic!("Expected Created, got {:?}", other),
        }
    }

    #[test]
    fn decodes_deleted_by_id() {
        let event = ItemEvent::decode(r#"{"kind":"deleted","id":"a"}"#).unwrap();
        assert_eq!(event, ItemEvent::Deleted(ItemId::from("a")));
    }

    #[test]
    fn deleted_falls_back_to_item_id() {
        let event = ItemEvent::decode(r#"{"kind":"DELETE","item":{"id":"b"}}"#).unwrap();
        assert_eq!(event, ItemEvent::Deleted(ItemId::from("b")));
    }

    #[test]
    fn accepts_database_style_kinds() {
        let insert = ItemEvent::decode(r#"{"kind":"INSERT","item":{"id":"a"}}"#).unwrap();
        assert_eq!(insert.kind(), "created");

        let update = ItemEvent::decode(r#"{"kind":"Update","item":{"id":"a"}}"#).unwrap();
        assert_eq!(update.kind(), "updated");
    }

    #[test]
    fn unknown_kind_is_reported() {
        let err = ItemEvent::decode(r#"{"kind":"archived","id":"a"}"#).unwrap_err();
        assert!(err.is_unknown_kind());
    }

    #[test]
    fn missing_fields_are_reported() {
        let err = ItemEvent::decode(r#"{"kind":"updated"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingItem { kind: "updated" }));

        let err = ItemEvent::decode(r#"{"kind":"deleted"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingId));
    }

    #[test]
    fn garbage_is_invalid_json() {
        let err = ItemEvent::decode("not json").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidJson(_)));
    }

    #[test]
    fn constructors_round_trip_through_json() {
        let item = Item::new("a", ItemStatus::Approved, 4, 10).with_field("author", "Sam");
        let json = serde_json::to_string(&ChannelMessage::updated(item.clone())).unwrap();
        assert_eq!(ItemEvent::decode(&json).unwrap(), ItemEvent::Updated(item));

        let json = serde_json::to_string(&ChannelMessage::deleted("a")).unwrap();
        assert_eq!(json, r#"{"kind":"deleted","id":"a"}"#);
    }

    #[test]
    fn event_id_accessor() {
        let item = Item::new("x", ItemStatus::Approved, 1, 1);
        assert_eq!(ItemEvent::Created(item).id().as_str(), "x");
        assert_eq!(ItemEvent::Deleted("y".into()).id().as_str(), "y");
    }
}
