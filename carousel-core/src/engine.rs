//! The carousel engine - one coherent unit for the view layer.
//!
//! Composes the store, ingestion, cursor, autoplay, gesture and
//! transition components. Like the components themselves, the engine is
//! pure: every input takes the current [`Timestamp`] and returns the
//! [`Action`]s the driver must perform (arming and disarming timers,
//! dropping the channel subscription).
//!
//! ```text
//!  push channel ──► ingest ──► store ──► cursor (rebase)
//!  gestures ─────┐                          ▲
//!  autoplay ─────┼──► transition animator ──┘ (navigate)
//!  requests ─────┘
//! ```
//!
//! Inputs before [`CarouselEngine::mount`] or after
//! [`CarouselEngine::unmount`] are ignored.

use live_carousel_types::{ChannelMessage, DecodeError, Item, ItemEvent, ItemId, Timestamp};
use serde::Serialize;
use std::time::Duration;

use crate::autoplay::AutoplayScheduler;
use crate::config::{CarouselConfig, ConfigError};
use crate::cursor::CursorController;
use crate::gesture::{GestureInput, GestureOutcome, GestureRecognizer, Intent};
use crate::ingest::{IngestStats, IngestionAdapter};
use crate::store::CollectionStore;
use crate::transition::{NavRequest, TransitionAnimator, TransitionOutcome, TransitionState};

/// Instructions for the driver.
///
/// These are instructions, not side effects. The driver owns the real
/// timers and the channel subscription and interprets these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// (Re)start the autoplay timer; deliver `on_autoplay_tick` after `delay`.
    ArmAutoplay {
        /// Time until the tick.
        delay: Duration,
    },
    /// Cancel the autoplay timer.
    DisarmAutoplay,
    /// Start the transition timer; deliver `on_transition_end` after `delay`.
    ArmTransition {
        /// Time until the transition unlocks.
        delay: Duration,
    },
    /// Cancel the transition timer.
    DisarmTransition,
    /// Drop the push-channel subscription.
    Unsubscribe,
}

/// Read-only view state for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Visible items in display order.
    pub items: Vec<Item>,
    /// Index of the shown item, `None` when empty.
    pub cursor: Option<usize>,
    /// Animation lock state.
    pub transition: TransitionState,
    /// Whether autoplay is currently suspended.
    pub autoplay_paused: bool,
    /// How far the shown card should follow the finger.
    pub drag_offset: f32,
}

impl Snapshot {
    /// The item under the cursor.
    pub fn current(&self) -> Option<&Item> {
        self.cursor.and_then(|index| self.items.get(index))
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            transition: TransitionState::Idle,
            autoplay_paused: false,
            drag_offset: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Mounted,
    Unmounted,
}

/// The live carousel state machine - NO I/O, just state transitions.
#[derive(Debug, Clone)]
pub struct CarouselEngine {
    config: CarouselConfig,
    store: CollectionStore,
    ingest: IngestionAdapter,
    cursor: CursorController,
    autoplay: AutoplayScheduler,
    gesture: GestureRecognizer,
    animator: TransitionAnimator,
    lifecycle: Lifecycle,
    /// Paused through `pause_autoplay`.
    explicit_pause: bool,
    /// Paused because a drag is in progress.
    gesture_hold: bool,
}

impl CarouselEngine {
    /// Create an unmounted engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn new(config: CarouselConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store: CollectionStore::new(),
            ingest: IngestionAdapter::new(),
            cursor: CursorController::new(config.wrap_around),
            autoplay: AutoplayScheduler::new(config.autoplay_interval()),
            gesture: GestureRecognizer::from_config(&config),
            animator: TransitionAnimator::new(config.transition_duration()),
            lifecycle: Lifecycle::Created,
            explicit_pause: false,
            gesture_hold: false,
            config,
        })
    }

    /// Start the engine: autoplay begins counting from `now`.
    pub fn mount(&mut self, now: Timestamp) -> Vec<Action> {
        if self.lifecycle != Lifecycle::Created {
            return Vec::new();
        }
        self.lifecycle = Lifecycle::Mounted;
        self.autoplay
            .start(now)
            .map(|delay| vec![Action::ArmAutoplay { delay }])
            .unwrap_or_default()
    }

    /// Tear the engine down.
    ///
    /// Always asks for all three asynchronous resources to be released:
    /// the autoplay timer, the transition timer and the subscription.
    pub fn unmount(&mut self) -> Vec<Action> {
        if self.lifecycle != Lifecycle::Mounted {
            return Vec::new();
        }
        self.lifecycle = Lifecycle::Unmounted;
        self.autoplay.stop();
        self.animator.cancel();
        vec![
            Action::DisarmAutoplay,
            Action::DisarmTransition,
            Action::Unsubscribe,
        ]
    }

    /// Replace the collection with the result of the initial fetch.
    ///
    /// The previously shown item stays shown if it is still present.
    pub fn load(&mut self, items: Vec<Item>, now: Timestamp) -> Vec<Action> {
        if !self.is_mounted() {
            return Vec::new();
        }
        let shown = self.shown_id();
        self.store.replace_all(items);
        let follow = shown.and_then(|id| self.store.position(&id));

        let mut actions = Vec::new();
        if self.cursor.retarget(self.store.size(), follow) {
            self.restart_autoplay(now, &mut actions);
        }
        actions
    }

    /// Apply one typed change event.
    pub fn ingest(&mut self, event: ItemEvent, now: Timestamp) -> Vec<Action> {
        if !self.is_mounted() {
            return Vec::new();
        }
        let shown = self.shown_id();
        let outcome = self
            .ingest
            .apply(event, &mut self.store, &mut self.cursor);
        self.after_ingest(outcome.cursor_moved, shown, now)
    }

    /// Decode and apply one raw channel message.
    ///
    /// # Errors
    ///
    /// Returns the decode error so the caller can log it. The engine
    /// state is unchanged in that case.
    pub fn ingest_message(
        &mut self,
        message: ChannelMessage,
        now: Timestamp,
    ) -> Result<Vec<Action>, DecodeError> {
        if !self.is_mounted() {
            return Ok(Vec::new());
        }
        let shown = self.shown_id();
        let outcome = self
            .ingest
            .apply_message(message, &mut self.store, &mut self.cursor)?;
        Ok(self.after_ingest(outcome.cursor_moved, shown, now))
    }

    /// Navigate (dot click, arrow button, programmatic).
    pub fn request(&mut self, request: NavRequest, now: Timestamp) -> Vec<Action> {
        if !self.is_mounted() {
            return Vec::new();
        }
        let outcome = self.animator.request(request, now, &mut self.cursor);
        self.after_transition(outcome, now)
    }

    /// Feed raw pointer or key input.
    pub fn on_gesture(&mut self, input: GestureInput, now: Timestamp) -> Vec<Action> {
        if !self.is_mounted() {
            return Vec::new();
        }
        let was_dragging = self.gesture.is_dragging();
        let mut actions = Vec::new();

        match self.gesture.on_input(input) {
            GestureOutcome::Started => {
                self.gesture_hold = true;
                self.sync_autoplay(now, &mut actions);
            }
            GestureOutcome::Intent(intent) => {
                // Keys can arrive mid-drag; only a finished drag lifts the hold.
                if was_dragging && !self.gesture.is_dragging() {
                    self.gesture_hold = false;
                    self.sync_autoplay(now, &mut actions);
                }
                let request = match intent {
                    Intent::Advance => Some(NavRequest::Advance),
                    Intent::Retreat => Some(NavRequest::Retreat),
                    Intent::Cancelled => None,
                };
                if let Some(request) = request {
                    let outcome = self.animator.request(request, now, &mut self.cursor);
                    let turned = self.after_transition(outcome, now);
                    if turned.iter().any(is_arm_autoplay) {
                        actions.retain(|action| !is_arm_autoplay(action));
                    }
                    actions.extend(turned);
                }
            }
            GestureOutcome::Feedback(_) | GestureOutcome::Ignored => {}
        }
        actions
    }

    /// Suspend autoplay (hover, focus, explicit pause button).
    pub fn pause_autoplay(&mut self) -> Vec<Action> {
        if !self.is_mounted() {
            return Vec::new();
        }
        self.explicit_pause = true;
        let mut actions = Vec::new();
        if self.autoplay.pause() {
            actions.push(Action::DisarmAutoplay);
        }
        actions
    }

    /// Lift an explicit pause. A drag in progress still holds autoplay.
    pub fn resume_autoplay(&mut self, now: Timestamp) -> Vec<Action> {
        if !self.is_mounted() {
            return Vec::new();
        }
        self.explicit_pause = false;
        let mut actions = Vec::new();
        self.sync_autoplay(now, &mut actions);
        actions
    }

    /// The autoplay timer fired.
    pub fn on_autoplay_tick(&mut self, now: Timestamp) -> Vec<Action> {
        if !self.is_mounted() {
            return Vec::new();
        }
        if !self.autoplay.on_tick(now) {
            // Early or stale; keep the real deadline armed.
            return self
                .autoplay
                .delay(now)
                .map(|delay| vec![Action::ArmAutoplay { delay }])
                .unwrap_or_default();
        }

        let mut actions = if self.store.is_empty() {
            Vec::new()
        } else {
            let outcome = self.animator.request(NavRequest::Advance, now, &mut self.cursor);
            self.after_transition(outcome, now)
        };
        if !actions.iter().any(is_arm_autoplay) {
            if let Some(delay) = self.autoplay.delay(now) {
                actions.push(Action::ArmAutoplay { delay });
            }
        }
        actions
    }

    /// The transition timer fired.
    pub fn on_transition_end(&mut self, now: Timestamp) -> Vec<Action> {
        if !self.is_mounted() {
            return Vec::new();
        }
        let outcome = self.animator.on_timer(now, &mut self.cursor);
        self.after_transition(outcome, now)
    }

    /// Current view state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            items: self.store.items().to_vec(),
            cursor: self.cursor.position(),
            transition: self.animator.state(),
            autoplay_paused: self.autoplay.is_paused(),
            drag_offset: self.gesture.offset(),
        }
    }

    /// Index of the shown item.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor.position()
    }

    /// The shown item.
    pub fn current_item(&self) -> Option<&Item> {
        self.cursor.position().and_then(|index| self.store.at(index))
    }

    /// The collection.
    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    /// Animation lock state.
    pub fn transition_state(&self) -> TransitionState {
        self.animator.state()
    }

    /// The autoplay scheduler (read-only).
    pub fn autoplay(&self) -> &AutoplayScheduler {
        &self.autoplay
    }

    /// Ingestion counters.
    pub fn ingest_stats(&self) -> IngestStats {
        self.ingest.stats()
    }

    /// Active configuration.
    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    /// Whether the engine is between mount and unmount.
    pub fn is_mounted(&self) -> bool {
        self.lifecycle == Lifecycle::Mounted
    }

    fn after_transition(&mut self, outcome: TransitionOutcome, now: Timestamp) -> Vec<Action> {
        let mut actions = Vec::new();
        if let TransitionOutcome::Started { duration, .. } = outcome {
            actions.push(Action::ArmTransition { delay: duration });
            self.restart_autoplay(now, &mut actions);
        }
        actions
    }

    fn shown_id(&self) -> Option<ItemId> {
        self.current_item().map(|item| item.id.clone())
    }

    /// A new item under the cursor gets a full interval, even at the same index.
    fn after_ingest(
        &mut self,
        cursor_moved: bool,
        shown_before: Option<ItemId>,
        now: Timestamp,
    ) -> Vec<Action> {
        let mut actions = Vec::new();
        if cursor_moved || self.shown_id() != shown_before {
            self.restart_autoplay(now, &mut actions);
        }
        actions
    }

    fn restart_autoplay(&mut self, now: Timestamp, actions: &mut Vec<Action>) {
        if let Some(delay) = self.autoplay.restart(now) {
            actions.push(Action::ArmAutoplay { delay });
        }
    }

    /// Reconcile the scheduler with the explicit and gesture pause flags.
    fn sync_autoplay(&mut self, now: Timestamp, actions: &mut Vec<Action>) {
        let want_paused = self.explicit_pause || self.gesture_hold;
        if want_paused {
            if self.autoplay.pause() {
                actions.push(Action::DisarmAutoplay);
            }
        } else if let Some(delay) = self.autoplay.resume(now) {
            actions.push(Action::ArmAutoplay { delay });
        }
    }
}

fn is_arm_autoplay(action: &Action) -> bool {
    matches!(action, Action::ArmAutoplay { .. })
}
