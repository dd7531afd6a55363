//! # carousel-core
//!
//! Pure logic for the live carousel (no I/O, instant tests).
//!
//! This crate implements the data structures and state machines behind a
//! swipeable, auto-advancing view over a server-streamed list, without any
//! timers, network or clock access.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input (including the
//! current [`Timestamp`](live_carousel_types::Timestamp)) and produce output
//! without side effects. This enables:
//! - Instant unit tests (no mocks, no async, no sleeping)
//! - Deterministic behavior (same input → same output)
//! - Easy reasoning about state transitions
//!
//! Timers are requested through [`Action`]s. The actual timers, the push
//! channel and the initial fetch live in `carousel-client`, which
//! interprets those actions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod autoplay;
pub mod config;
pub mod cursor;
pub mod engine;
pub mod gesture;
pub mod ingest;
pub mod store;
pub mod transition;

pub use autoplay::AutoplayScheduler;
pub use config::{CarouselConfig, ConfigError};
pub use cursor::CursorController;
pub use engine::{Action, CarouselEngine, Snapshot};
pub use gesture::{GestureInput, GestureOutcome, GestureRecognizer, Intent, KeyNav};
pub use ingest::{IngestOutcome, IngestStats, IngestionAdapter};
pub use store::{CollectionStore, StoreDelta};
pub use transition::{Direction, NavRequest, TransitionAnimator, TransitionOutcome, TransitionState};
