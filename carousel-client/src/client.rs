//! CarouselClient - the async driver for the live carousel.
//!
//! # Architecture
//!
//! The client uses the pure [`CarouselEngine`] (from carousel-core) for all
//! carousel logic and interprets the actions it returns to perform actual
//! I/O: two real timers and the push-channel subscription.
//!
//! ```text
//! View → CarouselHandle ──commands──► driver task ──► EventSource
//!            ▲                           │ ▲
//!            └──────watch(Snapshot)──────┘ └── autoplay / transition deadlines
//!                                        ↓
//!                           carousel-core (pure state machine)
//! ```
//!
//! Exactly one task owns the engine, so every input (channel event,
//! gesture, timer expiry) is applied to a consistent state, one at a time.
//!
//! # Example
//!
//! ```ignore
//! use live_carousel_client::{CarouselClient, MockEventSource, MockFetcher};
//!
//! let client = CarouselClient::new(CarouselConfig::default())?;
//! let mut handle = client.mount(MockEventSource::new(), &MockFetcher::new(items)).await?;
//!
//! handle.next()?;
//! let snapshot = handle.changed().await?;
//! handle.unmount().await?;
//! ```

use live_carousel_core::{
    Action, CarouselConfig, CarouselEngine, GestureInput, NavRequest, Snapshot,
};
use live_carousel_types::{ChannelMessage, Timestamp};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::source::{EventSource, ItemFetcher, SourceError};

/// What the view can ask of the engine.
#[derive(Debug)]
enum ViewInput {
    Request(NavRequest),
    Gesture(GestureInput),
    PauseAutoplay,
    ResumeAutoplay,
}

/// Messages from the handle to the driver task.
#[derive(Debug)]
enum Command {
    Input(ViewInput),
    Unmount,
}

/// Monotonic milliseconds since mount.
#[derive(Debug, Clone, Copy)]
struct Clock {
    origin: Instant,
}

impl Clock {
    fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    fn stamp(&self, at: Instant) -> Timestamp {
        let elapsed = at.saturating_duration_since(self.origin).as_millis();
        Timestamp::from_millis(u64::try_from(elapsed).unwrap_or(u64::MAX))
    }
}

/// The two real timers, as absolute deadlines.
#[derive(Debug, Default)]
struct Deadlines {
    autoplay: Option<Instant>,
    transition: Option<Instant>,
}

impl Deadlines {
    fn apply(&mut self, actions: &[Action], at: Instant) {
        for action in actions {
            match *action {
                Action::ArmAutoplay { delay } => self.autoplay = Some(at + delay),
                Action::DisarmAutoplay => self.autoplay = None,
                Action::ArmTransition { delay } => self.transition = Some(at + delay),
                Action::DisarmTransition => self.transition = None,
                Action::Unsubscribe => {}
            }
        }
    }
}

/// Sleep until `deadline`, or forever when there is none.
async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Entry point: validates configuration and mounts carousels.
#[derive(Debug, Clone)]
pub struct CarouselClient {
    config: CarouselConfig,
}

impl CarouselClient {
    /// Create a client with validated configuration.
    pub fn new(config: CarouselConfig) -> Result<Self, ClientError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create a client from a loaded configuration file.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(config.carousel.clone())
    }

    /// The configuration carousels are mounted with.
    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    /// Mount a carousel and start its driver task.
    ///
    /// Subscribes to `source` first, then runs the initial fetch, so no
    /// change published while the fetch is in flight is lost. Events that
    /// queue up meanwhile are applied after the fetched collection.
    ///
    /// A failed subscribe or fetch is logged and the carousel still
    /// mounts: without live updates, or with an empty collection.
    pub async fn mount<S, F>(&self, mut source: S, fetcher: &F) -> Result<CarouselHandle, ClientError>
    where
        S: EventSource,
        F: ItemFetcher + ?Sized,
    {
        let clock = Clock::start();
        let mut engine = CarouselEngine::new(self.config.clone())?;
        let mut deadlines = Deadlines::default();

        let subscribed = match source.subscribe().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Subscribe failed, running without live updates: {}", e);
                false
            }
        };

        let at = Instant::now();
        deadlines.apply(&engine.mount(clock.stamp(at)), at);

        match fetcher.fetch_items().await {
            Ok(items) => {
                let fetched = items.len();
                let at = Instant::now();
                deadlines.apply(&engine.load(items, clock.stamp(at)), at);
                tracing::debug!(
                    "Initial fetch: {} items, {} visible",
                    fetched,
                    engine.store().size()
                );
            }
            Err(e) => {
                tracing::warn!("Initial fetch failed, starting empty: {}", e);
            }
        }

        let (commands, commands_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshots) = watch::channel(engine.snapshot());

        tracing::info!("Carousel mounted with {} items", engine.store().size());

        let driver = Driver {
            engine,
            clock,
            deadlines,
            subscribed,
        };
        let task = tokio::spawn(driver.run(source, commands_rx, snapshot_tx));

        Ok(CarouselHandle {
            commands,
            snapshots,
            task: Some(task),
        })
    }
}

/// State owned by the driver task.
struct Driver {
    engine: CarouselEngine,
    clock: Clock,
    deadlines: Deadlines,
    subscribed: bool,
}

impl Driver {
    async fn run<S: EventSource>(
        mut self,
        mut source: S,
        mut commands: mpsc::UnboundedReceiver<Command>,
        snapshots: watch::Sender<Snapshot>,
    ) {
        let mut live = self.subscribed;

        loop {
            let autoplay_at = self.deadlines.autoplay;
            let transition_at = self.deadlines.transition;

            let (at, actions) = tokio::select! {
                command = commands.recv() => {
                    // Every handle dropped counts as unmount
                    let input = match command {
                        None | Some(Command::Unmount) => break,
                        Some(Command::Input(input)) => input,
                    };
                    let at = Instant::now();
                    (at, self.on_input(input, self.clock.stamp(at)))
                }
                received = source.recv(), if live => {
                    let at = Instant::now();
                    let actions = match received {
                        Ok(Some(message)) => self.on_message(message, self.clock.stamp(at)),
                        Ok(None) => {
                            tracing::info!("Event channel closed, live updates stopped");
                            live = false;
                            Vec::new()
                        }
                        Err(e) => {
                            if e.is_terminal() {
                                live = false;
                            }
                            self.on_source_error(&e);
                            Vec::new()
                        }
                    };
                    (at, actions)
                }
                _ = sleep_until_opt(autoplay_at) => {
                    self.deadlines.autoplay = None;
                    let at = Instant::now();
                    (at, self.engine.on_autoplay_tick(self.clock.stamp(at)))
                }
                _ = sleep_until_opt(transition_at) => {
                    self.deadlines.transition = None;
                    let at = Instant::now();
                    (at, self.engine.on_transition_end(self.clock.stamp(at)))
                }
            };

            self.deadlines.apply(&actions, at);
            publish(&snapshots, self.engine.snapshot());
        }

        let actions = self.engine.unmount();
        self.deadlines.apply(&actions, Instant::now());
        if self.subscribed && actions.contains(&Action::Unsubscribe) {
            if let Err(e) = source.unsubscribe().await {
                tracing::warn!("Unsubscribe failed: {}", e);
            }
        }
        publish(&snapshots, self.engine.snapshot());

        let stats = self.engine.ingest_stats();
        tracing::info!(
            "Carousel unmounted ({} events applied, {} unchanged, {} malformed)",
            stats.applied,
            stats.unchanged,
            stats.malformed
        );
    }

    fn on_input(&mut self, input: ViewInput, now: Timestamp) -> Vec<Action> {
        match input {
            ViewInput::Request(request) => {
                tracing::debug!("Navigation request {:?}", request);
                self.engine.request(request, now)
            }
            ViewInput::Gesture(gesture) => self.engine.on_gesture(gesture, now),
            ViewInput::PauseAutoplay => self.engine.pause_autoplay(),
            ViewInput::ResumeAutoplay => self.engine.resume_autoplay(now),
        }
    }

    fn on_message(&mut self, message: ChannelMessage, now: Timestamp) -> Vec<Action> {
        let kind = message.kind.clone();
        match self.engine.ingest_message(message, now) {
            Ok(actions) => {
                tracing::debug!(
                    "Ingested {} event, {} items, cursor {:?}",
                    kind,
                    self.engine.store().size(),
                    self.engine.cursor()
                );
                actions
            }
            Err(e) if e.is_unknown_kind() => {
                tracing::debug!("Ignored message: {}", e);
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Dropped malformed {} message: {}", kind, e);
                Vec::new()
            }
        }
    }

    fn on_source_error(&self, error: &SourceError) {
        match error {
            SourceError::Decode(e) => tracing::warn!("Dropped malformed frame: {}", e),
            e if e.is_terminal() => tracing::warn!("Event channel lost: {}", e),
            e => tracing::warn!("Receive error: {}", e),
        }
    }
}

/// Publish only real changes so watchers are not woken for nothing.
fn publish(snapshots: &watch::Sender<Snapshot>, next: Snapshot) {
    snapshots.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}

/// View-side handle to a mounted carousel.
///
/// Dropping the handle unmounts the carousel.
#[derive(Debug)]
pub struct CarouselHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Snapshot>,
    task: Option<JoinHandle<()>>,
}

impl CarouselHandle {
    /// Submit a navigation request.
    pub fn request(&self, request: NavRequest) -> Result<(), ClientError> {
        self.send(ViewInput::Request(request))
    }

    /// Show the next item.
    pub fn next(&self) -> Result<(), ClientError> {
        self.request(NavRequest::Advance)
    }

    /// Show the previous item.
    pub fn prev(&self) -> Result<(), ClientError> {
        self.request(NavRequest::Retreat)
    }

    /// Show the item at `index` (dot click).
    pub fn jump_to(&self, index: usize) -> Result<(), ClientError> {
        self.request(NavRequest::JumpTo(index))
    }

    /// Feed raw pointer or key input.
    pub fn on_gesture(&self, input: GestureInput) -> Result<(), ClientError> {
        self.send(ViewInput::Gesture(input))
    }

    /// Suspend autoplay.
    pub fn pause_autoplay(&self) -> Result<(), ClientError> {
        self.send(ViewInput::PauseAutoplay)
    }

    /// Resume autoplay with a full interval.
    pub fn resume_autoplay(&self) -> Result<(), ClientError> {
        self.send(ViewInput::ResumeAutoplay)
    }

    /// Latest published view state.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver for rendering loops that want every change.
    pub fn watch(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Wait for the next published change.
    pub async fn changed(&mut self) -> Result<Snapshot, ClientError> {
        self.snapshots
            .changed()
            .await
            .map_err(|_| ClientError::Unmounted)?;
        Ok(self.snapshots.borrow_and_update().clone())
    }

    /// Wait until the published state satisfies `predicate`.
    pub async fn wait_until<P>(&mut self, predicate: P) -> Result<Snapshot, ClientError>
    where
        P: Fn(&Snapshot) -> bool,
    {
        loop {
            {
                let current = self.snapshots.borrow_and_update();
                if predicate(&current) {
                    return Ok(current.clone());
                }
            }
            self.snapshots
                .changed()
                .await
                .map_err(|_| ClientError::Unmounted)?;
        }
    }

    /// Unmount: cancel both timers, unsubscribe and wait for the driver.
    pub async fn unmount(mut self) -> Result<(), ClientError> {
        let _ = self.commands.send(Command::Unmount);
        if let Some(task) = self.task.take() {
            task.await
                .map_err(|e| ClientError::DriverFailed(e.to_string()))?;
        }
        Ok(())
    }

    fn send(&self, input: ViewInput) -> Result<(), ClientError> {
        self.commands
            .send(Command::Input(input))
            .map_err(|_| ClientError::Unmounted)
    }
}

impl Drop for CarouselHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.commands.send(Command::Unmount);
        }
    }
}
