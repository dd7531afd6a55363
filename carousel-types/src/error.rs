//! Error types for inbound carousel events.

use thiserror::Error;

/// Reasons an inbound channel message cannot become an [`crate::ItemEvent`].
///
/// These never reach the view layer: the ingesting side logs and drops
/// the message.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The message body is not valid JSON for a channel message.
    #[error("invalid message JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The `kind` tag is not one this version understands.
    #[error("unknown event kind: {0}")]
    UnknownKind(String),

    /// A created/updated message arrived without an item.
    #[error("{kind} event is missing its item")]
    MissingItem {
        /// The event kind that required an item.
        kind: &'static str,
    },

    /// A deleted message arrived with neither an id nor an item.
    #[error("deleted event is missing its id")]
    MissingId,
}

impl DecodeError {
    /// Whether this is a forward-compatibility skip rather than a broken message.
    pub fn is_unknown_kind(&self) -> bool {
        matches!(self, Self::UnknownKind(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DecodeError::UnknownKind("archived".into());
        assert_eq!(err.to_string(), "unknown event kind: archived");

        let err = DecodeError::MissingItem { kind: "created" };
        assert_eq!(err.to_string(), "created event is missing its item");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DecodeError>();
    }
}
