//! Drag/swipe and key input recognition.
//!
//! Turns raw pointer positions into navigation intents. The recognizer
//! depends on nothing else in the carousel; it only reports what the
//! user meant and how far the card should follow the finger.
//!
//! ```text
//! Idle ──DragStart──► Dragging ──DragEnd/DragCancel──► Idle
//!                        │ ▲
//!                        └─┘ DragMove (feedback only)
//! ```

use crate::config::CarouselConfig;

/// Raw user input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureInput {
    /// Pointer pressed at `(x, y)`.
    DragStart {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },
    /// Pointer moved to `(x, y)` while pressed.
    DragMove {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },
    /// Pointer released at `(x, y)`.
    DragEnd {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },
    /// The platform took the pointer away (scroll, blur, ...).
    DragCancel,
    /// Discrete previous/next input (arrow keys, buttons).
    Key(KeyNav),
}

/// Discrete navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyNav {
    /// Show the previous item.
    Previous,
    /// Show the next item.
    Next,
}

/// What a completed gesture asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Show the next item (swipe left).
    Advance,
    /// Show the previous item (swipe right).
    Retreat,
    /// Not a swipe; snap back.
    Cancelled,
}

/// Result of feeding one input to the recognizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// Nothing to report (input ignored in the current state).
    Ignored,
    /// A drag began; the view should hold still.
    Started,
    /// The card should follow the finger by this clamped offset.
    Feedback(f32),
    /// The gesture is over.
    Intent(Intent),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging { origin_x: f32, origin_y: f32 },
}

/// Swipe recognizer state machine.
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    threshold: f32,
    perpendicular_tolerance: f32,
    max_feedback: f32,
    state: DragState,
    offset: f32,
}

impl GestureRecognizer {
    /// Create an idle recognizer with explicit thresholds.
    pub fn new(threshold: f32, perpendicular_tolerance: f32, max_feedback: f32) -> Self {
        Self {
            threshold,
            perpendicular_tolerance,
            max_feedback,
            state: DragState::Idle,
            offset: 0.0,
        }
    }

    /// Create a recognizer from carousel configuration.
    pub fn from_config(config: &CarouselConfig) -> Self {
        Self::new(
            config.drag_threshold_px,
            config.perpendicular_tolerance_px,
            config.max_drag_feedback_px,
        )
    }

    /// Feed one input.
    pub fn on_input(&mut self, input: GestureInput) -> GestureOutcome {
        match (self.state, input) {
            (_, GestureInput::Key(KeyNav::Next)) => GestureOutcome::Intent(Intent::Advance),
            (_, GestureInput::Key(KeyNav::Previous)) => GestureOutcome::Intent(Intent::Retreat),

            (_, GestureInput::DragStart { x, y }) => {
                self.state = DragState::Dragging {
                    origin_x: x,
                    origin_y: y,
                };
                self.offset = 0.0;
                GestureOutcome::Started
            }

            (DragState::Dragging { origin_x, .. }, GestureInput::DragMove { x, .. }) => {
                self.offset = (x - origin_x).clamp(-self.max_feedback, self.max_feedback);
                GestureOutcome::Feedback(self.offset)
            }

            (DragState::Dragging { origin_x, origin_y }, GestureInput::DragEnd { x, y }) => {
                self.reset();
                GestureOutcome::Intent(self.classify(x - origin_x, y - origin_y))
            }

            (DragState::Dragging { .. }, GestureInput::DragCancel) => {
                self.reset();
                GestureOutcome::Intent(Intent::Cancelled)
            }

            (DragState::Idle, _) => GestureOutcome::Ignored,
        }
    }

    /// Decide what a finished drag of `(dx, dy)` means.
    pub fn classify(&self, dx: f32, dy: f32) -> Intent {
        if dx.abs() > self.threshold && dy.abs() < self.perpendicular_tolerance {
            if dx < 0.0 {
                Intent::Advance
            } else {
                Intent::Retreat
            }
        } else {
            Intent::Cancelled
        }
    }

    /// Current follow offset for the view (0 when not dragging).
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    fn reset(&mut self) {
        self.state = DragState::Idle;
        self.offset = 0.0;
    }
}
