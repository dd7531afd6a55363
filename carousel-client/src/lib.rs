//! # carousel-client
//!
//! Async driver for the live carousel.
//!
//! This is the library a view layer mounts. It owns the real timers and
//! the push-channel subscription, and drives the pure engine from
//! carousel-core.
//!
//! ## Features
//!
//! - **Single event loop**: one tokio task per carousel serializes channel
//!   events, gestures and timer expiries
//! - **Subscribe-then-fetch**: no change is lost while the initial fetch runs
//! - **Source abstraction**: pluggable event source and fetcher (mocks included)
//! - **Pure State Machine**: uses carousel-core for side-effect-free logic
//!
//! ## Example
//!
//! ```ignore
//! use live_carousel_client::{CarouselClient, ClientConfig};
//!
//! let config = ClientConfig::from_file(Path::new("carousel.toml"))?;
//! let client = CarouselClient::from_config(&config)?;
//! let mut handle = client.mount(source, &fetcher).await?;
//!
//! while let Ok(snapshot) = handle.changed().await {
//!     render(&snapshot);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod source;

pub use client::{CarouselClient, CarouselHandle};
pub use config::ClientConfig;
pub use error::ClientError;
pub use source::{EventSource, ItemFetcher, MockEventSource, MockFetcher, SourceError};
