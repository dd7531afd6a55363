//! Autoplay scheduling.
//!
//! A single periodic timer. The scheduler does not own a real timer; it
//! tracks when the next tick is due and tells the caller how long to
//! sleep. A tick is honored only once that deadline has passed, so two
//! honored ticks are always at least one interval apart no matter how
//! late or early the driver delivers them.
//!
//! The deadline is pushed back a full interval whenever the cursor moves
//! for any reason, so a manual swipe is never followed by an immediate
//! autoplay advance.

use live_carousel_types::Timestamp;
use std::time::Duration;

/// Owns the autoplay state: interval, pause flag, last fire time.
#[derive(Debug, Clone)]
pub struct AutoplayScheduler {
    interval: Duration,
    paused: bool,
    running: bool,
    last_fired: Option<Timestamp>,
    due_at: Option<Timestamp>,
}

impl AutoplayScheduler {
    /// Create a stopped scheduler with the given period.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            paused: false,
            running: false,
            last_fired: None,
            due_at: None,
        }
    }

    /// Start ticking (on mount). Returns the delay until the first tick.
    pub fn start(&mut self, now: Timestamp) -> Option<Duration> {
        self.running = true;
        self.arm(now)
    }

    /// Stop ticking for good (on unmount).
    pub fn stop(&mut self) {
        self.running = false;
        self.due_at = None;
    }

    /// Suspend autoplay. Returns `true` if this call changed anything.
    pub fn pause(&mut self) -> bool {
        if self.paused {
            return false;
        }
        self.paused = true;
        self.due_at = None;
        true
    }

    /// Resume autoplay with a full fresh interval.
    ///
    /// Returns the delay until the next tick, or `None` if nothing
    /// changed (already running, or stopped).
    pub fn resume(&mut self, now: Timestamp) -> Option<Duration> {
        if !self.paused {
            return None;
        }
        self.paused = false;
        self.arm(now)
    }

    /// Push the next tick back a full interval from `now`.
    ///
    /// Called whenever the cursor changes. Returns the new delay, or
    /// `None` while paused or stopped.
    pub fn restart(&mut self, now: Timestamp) -> Option<Duration> {
        self.arm(now)
    }

    /// Deliver a timer tick.
    ///
    /// Returns `true` if the tick is honored, in which case the next tick
    /// is already scheduled one interval from `now` (see [`Self::delay`]).
    /// Early, stale, paused and stopped ticks return `false`.
    pub fn on_tick(&mut self, now: Timestamp) -> bool {
        match self.due_at {
            Some(due) if self.is_active() && now >= due => {
                self.last_fired = Some(now);
                self.due_at = Some(now.after(self.interval));
                true
            }
            _ => false,
        }
    }

    /// Time left until the next tick as seen from `now`.
    pub fn delay(&self, now: Timestamp) -> Option<Duration> {
        self.due_at.map(|due| due.since(now))
    }

    /// Whether autoplay is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether ticks are being scheduled at all.
    pub fn is_active(&self) -> bool {
        self.running && !self.paused
    }

    /// When the last honored tick happened.
    pub fn last_fired(&self) -> Option<Timestamp> {
        self.last_fired
    }

    /// When the next tick is due.
    pub fn due_at(&self) -> Option<Timestamp> {
        self.due_at
    }

    /// The autoplay period.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn arm(&mut self, now: Timestamp) -> Option<Duration> {
        if !self.is_active() {
            return None;
        }
        self.due_at = Some(now.after(self.interval));
        Some(self.interval)
    }
}
