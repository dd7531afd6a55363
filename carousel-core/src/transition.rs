//! Transition locking.
//!
//! Every navigation goes through the [`TransitionAnimator`], the single
//! serialization point between the producers (autoplay, gestures, dot
//! clicks) and the cursor.
//!
//! ```text
//!            request (cursor moves)
//!   Idle ───────────────────────────► Turning(direction)
//!    ▲                                  │  requests → pending (at most one)
//!    └────── timer expiry ◄─────────────┘
//!            (pending, if any, is accepted right away)
//! ```
//!
//! The cursor is committed when a transition *starts*, so "which item is
//! active" is correct for the whole animation. A store mutation landing
//! mid-animation rebases the cursor immediately and the animation simply
//! ends on the fresher item.

use live_carousel_types::Timestamp;
use serde::Serialize;
use std::time::Duration;

use crate::cursor::CursorController;

/// Which way a transition moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards higher indexes (or wrapping to the first item).
    Forward,
    /// Towards lower indexes (or wrapping to the last item).
    Backward,
}

/// A navigation request from any producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavRequest {
    /// Show the next item.
    Advance,
    /// Show the previous item.
    Retreat,
    /// Show the item at this index (clamped).
    JumpTo(usize),
}

/// Animation lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TransitionState {
    /// No transition in flight.
    #[default]
    Idle,
    /// A transition is in flight; the cursor already points at its target.
    Turning {
        /// Which way the slide moves.
        direction: Direction,
        /// When the transition started.
        started_at: Timestamp,
    },
}

/// Result of a request or a timer expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// A transition began and the cursor moved. The caller must arm the
    /// transition timer for `duration`.
    Started {
        /// Which way the slide moves.
        direction: Direction,
        /// Lock duration.
        duration: Duration,
    },
    /// The request is parked until the current transition ends.
    Coalesced,
    /// The transition ended with nothing pending.
    Settled,
    /// Nothing happened (no-op navigation, stale timer).
    Ignored,
}

/// Serializes cursor changes behind a fixed-duration lock.
#[derive(Debug, Clone)]
pub struct TransitionAnimator {
    duration: Duration,
    state: TransitionState,
    pending: Option<NavRequest>,
}

impl TransitionAnimator {
    /// Create an idle animator with the given lock duration.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            state: TransitionState::Idle,
            pending: None,
        }
    }

    /// Submit a navigation request.
    ///
    /// While idle the cursor is moved right away. While turning the
    /// request is coalesced into the single pending slot.
    pub fn request(
        &mut self,
        request: NavRequest,
        now: Timestamp,
        cursor: &mut CursorController,
    ) -> TransitionOutcome {
        match self.state {
            TransitionState::Idle => self.accept(request, now, cursor),
            TransitionState::Turning { .. } => {
                self.coalesce(request);
                TransitionOutcome::Coalesced
            }
        }
    }

    /// The transition timer fired.
    ///
    /// Unlocks, then accepts the pending request if there is one. A timer
    /// that fires while idle or before the lock duration is ignored.
    pub fn on_timer(&mut self, now: Timestamp, cursor: &mut CursorController) -> TransitionOutcome {
        let TransitionState::Turning { started_at, .. } = self.state else {
            return TransitionOutcome::Ignored;
        };
        if now < started_at.after(self.duration) {
            return TransitionOutcome::Ignored;
        }

        self.state = TransitionState::Idle;
        match self.pending.take() {
            Some(request) => match self.accept(request, now, cursor) {
                started @ TransitionOutcome::Started { .. } => started,
                _ => TransitionOutcome::Settled,
            },
            None => TransitionOutcome::Settled,
        }
    }

    /// Drop the in-flight transition and any pending request.
    ///
    /// Returns `true` if a transition was in flight.
    pub fn cancel(&mut self) -> bool {
        let was_turning = self.is_turning();
        self.state = TransitionState::Idle;
        self.pending = None;
        was_turning
    }

    /// Current lock state.
    pub fn state(&self) -> TransitionState {
        self.state
    }

    /// The request waiting for the current transition to end.
    pub fn pending(&self) -> Option<NavRequest> {
        self.pending
    }

    /// Whether a transition is in flight.
    pub fn is_turning(&self) -> bool {
        matches!(self.state, TransitionState::Turning { .. })
    }

    /// Lock duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    fn accept(
        &mut self,
        request: NavRequest,
        now: Timestamp,
        cursor: &mut CursorController,
    ) -> TransitionOutcome {
        let from = cursor.position();
        let moved = match request {
            NavRequest::Advance => cursor.next(),
            NavRequest::Retreat => cursor.prev(),
            NavRequest::JumpTo(index) => cursor.jump_to(index),
        };
        if !moved {
            return TransitionOutcome::Ignored;
        }

        let direction = match request {
            NavRequest::Advance => Direction::Forward,
            NavRequest::Retreat => Direction::Backward,
            NavRequest::JumpTo(_) if cursor.position() > from => Direction::Forward,
            NavRequest::JumpTo(_) => Direction::Backward,
        };
        self.state = TransitionState::Turning {
            direction,
            started_at: now,
        };
        TransitionOutcome::Started {
            direction,
            duration: self.duration,
        }
    }

    /// Last write wins, except that a directional request never displaces
    /// a pending jump.
    fn coalesce(&mut self, request: NavRequest) {
        let keep_jump = matches!(self.pending, Some(NavRequest::JumpTo(_)))
            && !matches!(request, NavRequest::JumpTo(_));
        if !keep_jump {
            self.pending = Some(request);
        }
    }
}
