//! Mock event source and fetcher for testing.
//!
//! Allows pushing channel messages, forcing failures and inspecting
//! subscription state from outside the driver task.

use super::{EventSource, ItemFetcher, SourceError};
use async_trait::async_trait;
use live_carousel_types::{ChannelMessage, DecodeError, Item};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[derive(Debug)]
enum Delivery {
    Message(ChannelMessage),
    Malformed(DecodeError),
    Close,
}

/// Mock push channel.
///
/// Clones share state, so a test can keep one clone and hand the other
/// to the driver.
#[derive(Debug)]
pub struct MockEventSource {
    inner: Arc<Mutex<MockSourceInner>>,
    sender: mpsc::UnboundedSender<Delivery>,
    receiver: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Delivery>>>,
}

#[derive(Debug, Default)]
struct MockSourceInner {
    subscribed: bool,
    subscribe_count: usize,
    unsubscribe_count: usize,
    received_count: usize,
    fail_next_subscribe: Option<String>,
    fail_next_recv: Option<String>,
}

impl MockEventSource {
    /// Create a new mock source with an empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(Mutex::new(MockSourceInner::default())),
            sender,
            receiver: Arc::new(tokio::sync::Mutex::new(receiver)),
        }
    }

    /// Queue a message for a later `recv()`.
    pub fn push(&self, message: ChannelMessage) {
        let _ = self.sender.send(Delivery::Message(message));
    }

    /// Queue a raw JSON frame; malformed frames surface as decode errors.
    pub fn push_json(&self, json: &str) {
        let delivery = match ChannelMessage::from_json(json) {
            Ok(message) => Delivery::Message(message),
            Err(e) => Delivery::Malformed(e),
        };
        let _ = self.sender.send(delivery);
    }

    /// Close the channel from the remote side once queued messages drain.
    pub fn close(&self) {
        let _ = self.sender.send(Delivery::Close);
    }

    /// Cause the next subscribe() to fail with the given error.
    pub fn fail_next_subscribe(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_subscribe = Some(error.to_string());
    }

    /// Cause the next recv() to fail with the given error.
    pub fn fail_next_recv(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_recv = Some(error.to_string());
    }

    /// Whether a subscription is currently open.
    pub fn is_subscribed(&self) -> bool {
        self.inner.lock().unwrap().subscribed
    }

    /// How many times subscribe() succeeded.
    pub fn subscribe_count(&self) -> usize {
        self.inner.lock().unwrap().subscribe_count
    }

    /// How many times unsubscribe() was called.
    pub fn unsubscribe_count(&self) -> usize {
        self.inner.lock().unwrap().unsubscribe_count
    }

    /// How many messages have been handed out.
    pub fn received_count(&self) -> usize {
        self.inner.lock().unwrap().received_count
    }
}

impl Default for MockEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockEventSource {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            sender: self.sender.clone(),
            receiver: Arc::clone(&self.receiver),
        }
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn subscribe(&mut self) -> Result<(), SourceError> {
        let mut inner = self.inner.lock().unwrap();

        // Check for forced failure
        if let Some(error) = inner.fail_next_subscribe.take() {
            return Err(SourceError::SubscribeFailed(error));
        }

        inner.subscribed = true;
        inner.subscribe_count += 1;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<ChannelMessage>, SourceError> {
        {
            let mut inner = self.inner.lock().unwrap();

            if !inner.subscribed {
                return Err(SourceError::NotSubscribed);
            }

            // Check for forced failure
            if let Some(error) = inner.fail_next_recv.take() {
                return Err(SourceError::ReceiveFailed(error));
            }
        }

        let delivery = self.receiver.lock().await.recv().await;

        match delivery {
            Some(Delivery::Message(message)) => {
                self.inner.lock().unwrap().received_count += 1;
                Ok(Some(message))
            }
            Some(Delivery::Malformed(e)) => Err(SourceError::Decode(e)),
            Some(Delivery::Close) | None => Ok(None),
        }
    }

    async fn unsubscribe(&mut self) -> Result<(), SourceError> {
        let mut inner = self.inner.lock().unwrap();
        inner.subscribed = false;
        inner.unsubscribe_count += 1;
        Ok(())
    }
}

/// Mock initial fetch.
#[derive(Debug, Default)]
pub struct MockFetcher {
    inner: Arc<Mutex<MockFetcherInner>>,
}

#[derive(Debug, Default)]
struct MockFetcherInner {
    items: Vec<Item>,
    fetch_count: usize,
    fail_next_fetch: Option<String>,
}

impl MockFetcher {
    /// Create a fetcher that returns `items`.
    pub fn new(items: Vec<Item>) -> Self {
        let fetcher = Self::default();
        fetcher.set_items(items);
        fetcher
    }

    /// Replace what later fetches return.
    pub fn set_items(&self, items: Vec<Item>) {
        self.inner.lock().unwrap().items = items;
    }

    /// Cause the next fetch_items() to fail with the given error.
    pub fn fail_next_fetch(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_fetch = Some(error.to_string());
    }

    /// How many fetches were attempted.
    pub fn fetch_count(&self) -> usize {
        self.inner.lock().unwrap().fetch_count
    }
}

impl Clone for MockFetcher {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl ItemFetcher for MockFetcher {
    async fn fetch_items(&self) -> Result<Vec<Item>, SourceError> {
        let mut inner = self.inner.lock().unwrap();
        inner.fetch_count += 1;

        if let Some(error) = inner.fail_next_fetch.take() {
            return Err(SourceError::FetchFailed(error));
        }

        Ok(inner.items.clone())
    }
}
