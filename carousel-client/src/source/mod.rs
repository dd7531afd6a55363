//! Collaborators the driver talks to.
//!
//! The carousel needs two things from the outside world: a one-shot
//! fetch of the current collection, and a push channel of change events
//! for that collection. Both are traits so the driver can run against a
//! real backend or the in-memory mocks.
//!
//! # Design
//!
//! The event source is subscription-oriented:
//! - `subscribe()` opens the channel (before the initial fetch)
//! - `recv()` yields the next message, or `None` once the channel is closed
//! - `unsubscribe()` releases it (on unmount)
//!
//! # Example
//!
//! ```ignore
//! let source = MockEventSource::new();
//! source.push(ChannelMessage::created(item));
//! source.subscribe().await?;
//! let message = source.recv().await?;
//! ```

mod mock;

pub use mock::{MockEventSource, MockFetcher};

use async_trait::async_trait;
use live_carousel_types::{ChannelMessage, DecodeError, Item};
use thiserror::Error;

/// Event source and fetch errors.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Could not open the push channel.
    #[error("subscribe failed: {0}")]
    SubscribeFailed(String),

    /// `recv` was called without an open subscription.
    #[error("not subscribed")]
    NotSubscribed,

    /// The push channel is gone for good.
    #[error("channel closed")]
    Closed,

    /// One receive failed; later ones may succeed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// A frame arrived that is not a channel message.
    #[error("malformed frame: {0}")]
    Decode(#[from] DecodeError),

    /// The initial fetch failed.
    #[error("fetch failed: {0}")]
    FetchFailed(String),
}

impl SourceError {
    /// Whether the channel can produce nothing more after this error.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SourceError::Closed | SourceError::NotSubscribed)
    }
}

/// Push channel of change events for the collection.
///
/// Delivery is at-most-once and unordered; the carousel tolerates
/// duplicates, drops and reordering.
#[async_trait]
pub trait EventSource: Send + 'static {
    /// Open the channel.
    async fn subscribe(&mut self) -> Result<(), SourceError>;

    /// Wait for the next message.
    ///
    /// Returns `Ok(None)` once the channel has been closed by the remote.
    async fn recv(&mut self) -> Result<Option<ChannelMessage>, SourceError>;

    /// Release the channel.
    async fn unsubscribe(&mut self) -> Result<(), SourceError>;
}

/// One-shot read of the current collection.
#[async_trait]
pub trait ItemFetcher: Send + Sync {
    /// Fetch every item. Filtering and ordering happen in the store.
    async fn fetch_items(&self) -> Result<Vec<Item>, SourceError>;
}
