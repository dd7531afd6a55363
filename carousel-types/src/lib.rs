//! # carousel-types
//!
//! Item and event types for the live carousel.
//!
//! This crate provides the foundational types used across all carousel crates:
//! - [`ItemId`], [`Timestamp`] - Identity and time types
//! - [`Item`], [`ItemStatus`] - The displayed record and its visibility
//! - [`ChannelMessage`] - The inbound push-channel wire shape
//! - [`ItemEvent`] - Typed create/update/delete events
//! - [`DecodeError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod event;
mod ids;
mod item;

pub use error::DecodeError;
pub use event::{ChannelMessage, ItemEvent};
pub use ids::{ItemId, Timestamp};
pub use item::{Item, ItemStatus};
