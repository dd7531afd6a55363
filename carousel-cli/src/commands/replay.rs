//! Replay a recorded event stream through the engine.
//!
//! The events file is JSON lines. Each line is either a channel message
//! or a view input, optionally stamped with the millisecond it happened:
//!
//! ```text
//! {"at": 0,    "kind": "created", "item": {"id": "a", "status": "approved", "rating": 5, "created_at": 1}}
//! {"at": 1200, "input": "advance"}
//! {"at": 1300, "input": {"jump_to": 2}}
//! {"kind": "deleted", "id": "a"}
//! {"at": 1400, "input": {"drag_start": {"x": 300, "y": 40}}}
//! {"at": 1500, "input": {"drag_end": {"x": 220, "y": 42}}}
//! {"input": {"key": "previous"}}
//! ```
//!
//! Time runs on a virtual clock, so autoplay ticks and transition ends
//! fire exactly when they would in a live carousel. Lines without `at`
//! happen at the current time; lines stamped in the past are applied now.

use anyhow::{Context, Result};
use live_carousel_core::{
    Action, CarouselConfig, CarouselEngine, GestureInput, IngestStats, KeyNav, NavRequest,
    Snapshot, TransitionState,
};
use live_carousel_types::{ChannelMessage, Item, Timestamp};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A view input in the events file.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Input {
    /// Show the next item.
    Advance,
    /// Show the previous item.
    Retreat,
    /// Show the item at this index.
    JumpTo(usize),
    /// Suspend autoplay.
    PauseAutoplay,
    /// Resume autoplay.
    ResumeAutoplay,
    /// Finger or mouse down.
    DragStart { x: f32, y: f32 },
    /// Pointer moved while down.
    DragMove { x: f32, y: f32 },
    /// Pointer released.
    DragEnd { x: f32, y: f32 },
    /// Pointer taken away by the platform.
    DragCancel,
    /// Arrow key.
    Key(Key),
}

/// Arrow keys in the events file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    /// Show the next item.
    Next,
    /// Show the previous item.
    Previous,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Step {
    Input {
        #[serde(default)]
        at: Option<u64>,
        input: Input,
    },
    Message {
        #[serde(default)]
        at: Option<u64>,
        #[serde(flatten)]
        message: ChannelMessage,
    },
}

impl Step {
    fn at(&self) -> Option<u64> {
        match self {
            Step::Input { at, .. } | Step::Message { at, .. } => *at,
        }
    }
}

/// One line of `--trace` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceLine {
    /// Virtual time in milliseconds.
    pub at: u64,
    /// What happened.
    pub step: String,
    /// Cursor afterwards.
    pub cursor: Option<usize>,
    /// Id of the shown item afterwards.
    pub shown: Option<String>,
    /// Collection size afterwards.
    pub len: usize,
    /// Whether a transition is in flight afterwards.
    pub turning: bool,
}

/// Result of a replay.
#[derive(Debug, Clone)]
pub struct ReplayReport {
    /// Final view state.
    pub snapshot: Snapshot,
    /// Every step, in order, including timer expiries.
    pub trace: Vec<TraceLine>,
    /// Lines that could not be parsed or applied.
    pub skipped: usize,
    /// Ingestion counters.
    pub stats: IngestStats,
}

/// Virtual-time driver around the engine.
struct Replay {
    engine: CarouselEngine,
    now: Timestamp,
    autoplay_due: Option<Timestamp>,
    transition_due: Option<Timestamp>,
    trace: Vec<TraceLine>,
    skipped: usize,
}

impl Replay {
    fn start(config: CarouselConfig, initial: Vec<Item>) -> Result<Self> {
        let engine = CarouselEngine::new(config).context("Invalid carousel configuration")?;
        let mut replay = Self {
            engine,
            now: Timestamp::zero(),
            autoplay_due: None,
            transition_due: None,
            trace: Vec::new(),
            skipped: 0,
        };

        let actions = replay.engine.mount(replay.now);
        replay.perform(&actions);
        let actions = replay.engine.load(initial, replay.now);
        replay.perform(&actions);
        replay.record("load".to_string());
        Ok(replay)
    }

    fn perform(&mut self, actions: &[Action]) {
        for action in actions {
            match *action {
                Action::ArmAutoplay { delay } => self.autoplay_due = Some(self.now.after(delay)),
                Action::DisarmAutoplay => self.autoplay_due = None,
                Action::ArmTransition { delay } => {
                    self.transition_due = Some(self.now.after(delay))
                }
                Action::DisarmTransition => self.transition_due = None,
                Action::Unsubscribe => {}
            }
        }
    }

    /// Run the clock forward to `target`, firing timers on the way.
    fn advance_to(&mut self, target: Timestamp) {
        loop {
            let next = [self.transition_due, self.autoplay_due]
                .into_iter()
                .flatten()
                .min();
            match next {
                Some(due) if due <= target => {
                    self.now = due;
                    self.fire_due();
                }
                _ => break,
            }
        }
        self.now = self.now.max(target);
    }

    /// Fire one timer due at `now`; transition ends go first.
    fn fire_due(&mut self) {
        if self.transition_due == Some(self.now) {
            self.transition_due = None;
            let actions = self.engine.on_transition_end(self.now);
            self.perform(&actions);
            self.record("transition_end".to_string());
        } else if self.autoplay_due == Some(self.now) {
            self.autoplay_due = None;
            let actions = self.engine.on_autoplay_tick(self.now);
            self.perform(&actions);
            self.record("autoplay_tick".to_string());
        }
    }

    fn apply_line(&mut self, number: usize, line: &str) {
        let step: Step = match serde_json::from_str(line) {
            Ok(step) => step,
            Err(e) => {
                tracing::warn!("line {}: skipped unreadable step: {}", number, e);
                self.skipped += 1;
                return;
            }
        };

        if let Some(at) = step.at() {
            let at = Timestamp::from_millis(at);
            if at < self.now {
                tracing::debug!("line {}: stamped {} but clock is at {}", number, at, self.now);
            }
            self.advance_to(at);
        }

        let (label, actions) = match step {
            Step::Input { input, .. } => (format!("{:?}", input), self.apply_input(input)),
            Step::Message { message, .. } => {
                let label = describe(&message);
                match self.engine.ingest_message(message, self.now) {
                    Ok(actions) => (label, actions),
                    Err(e) => {
                        tracing::warn!("line {}: dropped {}: {}", number, label, e);
                        self.skipped += 1;
                        return;
                    }
                }
            }
        };
        self.perform(&actions);
        self.record(label);
    }

    fn apply_input(&mut self, input: Input) -> Vec<Action> {
        let now = self.now;
        let engine = &mut self.engine;
        match input {
            Input::Advance => engine.request(NavRequest::Advance, now),
            Input::Retreat => engine.request(NavRequest::Retreat, now),
            Input::JumpTo(index) => engine.request(NavRequest::JumpTo(index), now),
            Input::PauseAutoplay => engine.pause_autoplay(),
            Input::ResumeAutoplay => engine.resume_autoplay(now),
            Input::DragStart { x, y } => engine.on_gesture(GestureInput::DragStart { x, y }, now),
            Input::DragMove { x, y } => engine.on_gesture(GestureInput::DragMove { x, y }, now),
            Input::DragEnd { x, y } => engine.on_gesture(GestureInput::DragEnd { x, y }, now),
            Input::DragCancel => engine.on_gesture(GestureInput::DragCancel, now),
            Input::Key(Key::Next) => engine.on_gesture(GestureInput::Key(KeyNav::Next), now),
            Input::Key(Key::Previous) => {
                engine.on_gesture(GestureInput::Key(KeyNav::Previous), now)
            }
        }
    }

    fn record(&mut self, step: String) {
        self.trace.push(TraceLine {
            at: self.now.as_millis(),
            step,
            cursor: self.engine.cursor(),
            shown: self.engine.current_item().map(|item| item.id.to_string()),
            len: self.engine.store().size(),
            turning: matches!(self.engine.transition_state(), TransitionState::Turning { .. }),
        });
    }

    fn finish(self) -> ReplayReport {
        ReplayReport {
            snapshot: self.engine.snapshot(),
            trace: self.trace,
            skipped: self.skipped,
            stats: self.engine.ingest_stats(),
        }
    }
}

fn describe(message: &ChannelMessage) -> String {
    let id = message
        .item
        .as_ref()
        .map(|item| item.id.as_str())
        .or(message.id.as_ref().map(|id| id.as_str()))
        .unwrap_or("?");
    format!("{} {}", message.kind, id)
}

/// Replay `script` (JSON lines) against `initial`.
///
/// With `until`, the clock keeps running after the last line so pending
/// transitions settle and autoplay gets to fire.
pub fn replay(
    config: CarouselConfig,
    initial: Vec<Item>,
    script: &str,
    until: Option<u64>,
) -> Result<ReplayReport> {
    let mut replay = Replay::start(config, initial)?;

    for (index, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        replay.apply_line(index + 1, line);
    }

    if let Some(until) = until {
        replay.advance_to(Timestamp::from_millis(until));
    }

    Ok(replay.finish())
}

async fn load_items(path: &Path) -> Result<Vec<Item>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read initial items {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse initial items {}", path.display()))
}

/// Run the replay command.
pub async fn run(
    config: &CarouselConfig,
    events: &Path,
    initial: Option<&Path>,
    until: Option<u64>,
    trace: bool,
) -> Result<()> {
    let items = match initial {
        Some(path) => load_items(path).await?,
        None => Vec::new(),
    };
    let script = tokio::fs::read_to_string(events)
        .await
        .with_context(|| format!("Failed to read events file {}", events.display()))?;

    let report = replay(config.clone(), items, &script, until)?;

    if trace {
        for line in &report.trace {
            println!("{}", serde_json::to_string(line)?);
        }
    }
    println!("{}", serde_json::to_string_pretty(&report.snapshot)?);

    tracing::info!(
        "Replayed: {} applied, {} unchanged, {} skipped",
        report.stats.applied,
        report.stats.unchanged,
        report.skipped
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use live_carousel_types::ItemStatus;
    use std::time::Duration;

    fn approved(id: &str, rating: u8) -> Item {
        Item::new(id, ItemStatus::Approved, rating, 0)
    }

    fn abc() -> Vec<Item> {
        vec![approved("A", 5), approved("B", 4), approved("C", 3)]
    }

    fn config() -> CarouselConfig {
        CarouselConfig::default()
            .with_autoplay_interval(Duration::from_millis(1000))
            .with_transition_duration(Duration::from_millis(300))
    }

    fn shown(report: &ReplayReport) -> Option<&str> {
        report.snapshot.current().map(|item| item.id.as_str())
    }

    #[test]
    fn empty_script_shows_first_item() {
        let report = replay(config(), abc(), "", None).unwrap();

        assert_eq!(report.snapshot.cursor, Some(0));
        assert_eq!(shown(&report), Some("A"));
        assert_eq!(report.trace.len(), 1);
    }

    #[test]
    fn delete_under_cursor_shows_next() {
        let script = r#"{"kind": "deleted", "id": "A"}"#;
        let report = replay(config(), abc(), script, None).unwrap();

        assert_eq!(shown(&report), Some("B"));
        assert_eq!(report.stats.applied, 1);
    }

    #[test]
    fn prepend_keeps_viewed_item() {
        let script = r#"
{"input": {"jump_to": 2}}
{"at": 500, "kind": "created", "item": {"id": "D", "status": "approved", "rating": 5, "created_at": 0}}
"#;
        let report = replay(config(), abc(), script, None).unwrap();

        assert_eq!(report.snapshot.cursor, Some(3));
        assert_eq!(shown(&report), Some("C"));
    }

    #[test]
    fn autoplay_fires_on_virtual_clock() {
        let report = replay(config(), abc(), "", Some(2500)).unwrap();

        let ticks: Vec<u64> = report
            .trace
            .iter()
            .filter(|line| line.step == "autoplay_tick")
            .map(|line| line.at)
            .collect();
        assert_eq!(ticks, vec![1000, 2000]);
        assert_eq!(shown(&report), Some("C"));
    }

    #[test]
    fn manual_step_pushes_autoplay_back() {
        let script = r#"{"at": 900, "input": "advance"}"#;
        let report = replay(config(), abc(), script, Some(1500)).unwrap();

        assert!(!report.trace.iter().any(|line| line.step == "autoplay_tick"));
        assert_eq!(report.snapshot.cursor, Some(1));
    }

    #[test]
    fn paused_autoplay_never_fires() {
        let script = r#"{"input": "pause_autoplay"}"#;
        let report = replay(config(), abc(), script, Some(10_000)).unwrap();

        assert_eq!(report.snapshot.cursor, Some(0));
        assert!(report.snapshot.autoplay_paused);
    }

    #[test]
    fn transition_settles_before_next_tick() {
        let script = r#"{"at": 0, "input": "advance"}"#;
        let report = replay(config(), abc(), script, Some(1000)).unwrap();

        let steps: Vec<&str> = report.trace.iter().map(|line| line.step.as_str()).collect();
        assert_eq!(steps, vec!["load", "Advance", "transition_end", "autoplay_tick"]);
        assert_eq!(report.snapshot.cursor, Some(2));
    }

    #[test]
    fn bad_lines_are_skipped() {
        let script = r#"
not json
{"kind": "created"}
{"kind": "exploded", "id": "A"}
{"kind": "deleted", "id": "B"}
"#;
        let report = replay(config(), abc(), script, None).unwrap();

        assert_eq!(report.skipped, 3);
        assert_eq!(report.snapshot.items.len(), 2);
    }

    #[test]
    fn hidden_initial_items_are_filtered() {
        let initial = vec![
            approved("A", 5),
            Item::new("P", ItemStatus::Pending, 5, 0),
            Item::new("R", ItemStatus::Rejected, 5, 0),
        ];
        let report = replay(config(), initial, "", None).unwrap();
        assert_eq!(report.snapshot.items.len(), 1);
    }

    #[test]
    fn stale_timestamps_do_not_rewind_clock() {
        let script = r#"
{"at": 1500, "input": "pause_autoplay"}
{"at": 200, "kind": "deleted", "id": "C"}
"#;
        let report = replay(config(), abc(), script, None).unwrap();

        let last = report.trace.last().unwrap();
        assert_eq!(last.at, 1500);
        assert_eq!(last.len, 2);
    }

    #[test]
    fn swipe_gesture_navigates() {
        let script = r#"
{"at": 100, "input": {"drag_start": {"x": 300, "y": 40}}}
{"at": 150, "input": {"drag_move": {"x": 250, "y": 41}}}
{"at": 200, "input": {"drag_end": {"x": 200, "y": 42}}}
"#;
        let report = replay(config(), abc(), script, Some(600)).unwrap();

        assert_eq!(shown(&report), Some("B"));
        assert!(!report.snapshot.autoplay_paused);
        assert_eq!(report.snapshot.drag_offset, 0.0);
    }

    #[test]
    fn key_mid_drag_keeps_autoplay_held() {
        let script = r#"
{"at": 100, "input": {"drag_start": {"x": 300, "y": 40}}}
{"at": 200, "input": {"key": "next"}}
"#;
        let report = replay(config(), abc(), script, Some(5000)).unwrap();

        assert_eq!(shown(&report), Some("B"));
        assert!(report.snapshot.autoplay_paused);
        assert!(!report.trace.iter().any(|line| line.step == "autoplay_tick"));
    }

    #[test]
    fn invalid_config_is_an_error() {
        let config = CarouselConfig {
            autoplay_interval_ms: 0,
            ..CarouselConfig::default()
        };
        assert!(replay(config, abc(), "", None).is_err());
    }
}
