//! The display control loop.
//!
//! One cooperative loop owns the registry, the animation engine and the
//! display state. A fetch timer pulls new reports from the feed and a tick
//! timer advances the animations, so overlays keep running between fetches
//! and a slow or failing feed never stalls the display.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::animation::{AnimationEngine, Palette};
use crate::error::Result;
use crate::feed::{FetchResult, ReportFeed};
use crate::parser::parse_report;
use crate::registry::{MergeReport, Registry};
use crate::render::StripRenderer;
use crate::state::DisplayState;
use crate::status::Summary;

/// Default time between fetches.
pub const DEFAULT_FETCH_INTERVAL: Duration = Duration::from_secs(300);

/// Default time between animation ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(20);

/// Drives a strip from a report feed.
#[derive(Debug)]
pub struct Runner<F, R> {
    feed: F,
    renderer: R,
    registry: Registry,
    engine: AnimationEngine,
    state: DisplayState,
    fetch_interval: Duration,
    tick_interval: Duration,
    started: Instant,
    last_success: Option<DateTime<Utc>>,
    frames_shown: u64,
}

impl<F: ReportFeed, R: StripRenderer> Runner<F, R> {
    /// Create a runner. The fetch outcome starts out failed until the first
    /// fetch succeeds.
    pub fn new(
        feed: F,
        renderer: R,
        registry: Registry,
        palette: Palette,
        state: DisplayState,
    ) -> Self {
        let state = DisplayState {
            last_fetch_ok: false,
            ..state
        };
        let mut engine = AnimationEngine::new(palette);
        engine.update_base(&registry, &state);

        Self {
            feed,
            renderer,
            registry,
            engine,
            state,
            fetch_interval: DEFAULT_FETCH_INTERVAL,
            tick_interval: DEFAULT_TICK_INTERVAL,
            started: Instant::now(),
            last_success: None,
            frames_shown: 0,
        }
    }

    /// Set the fetch and tick intervals.
    #[must_use]
    pub fn with_intervals(mut self, fetch: Duration, tick: Duration) -> Self {
        self.fetch_interval = fetch;
        self.tick_interval = tick;
        self
    }

    /// The airport registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The animation engine.
    #[must_use]
    pub fn engine(&self) -> &AnimationEngine {
        &self.engine
    }

    /// Current display state.
    #[must_use]
    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    /// The renderer.
    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Number of frames handed to the renderer.
    #[must_use]
    pub fn frames_shown(&self) -> u64 {
        self.frames_shown
    }

    /// When reports were last fetched successfully.
    #[must_use]
    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        self.last_success
    }

    /// Summarize the display.
    #[must_use]
    pub fn summary(&self, now: DateTime<Utc>) -> Summary {
        Summary::collect(&self.registry, &self.state, self.last_success, now)
    }

    /// Change display settings and recompute resting colors.
    ///
    /// The fetch outcome is owned by the runner and is not affected.
    pub fn update_settings(&mut self, change: impl FnOnce(&mut DisplayState)) {
        let last_fetch_ok = self.state.last_fetch_ok;
        change(&mut self.state);
        self.state.last_fetch_ok = last_fetch_ok;
        self.engine.update_base(&self.registry, &self.state);
    }

    /// Parse report lines, merge them and recompute resting colors.
    pub fn apply_reports<S: AsRef<str>>(&mut self, lines: &[S]) -> MergeReport {
        let batch = lines.iter().map(|line| parse_report(line.as_ref()));
        let report = self.registry.merge(batch);
        self.engine.update_base(&self.registry, &self.state);
        report
    }

    /// Fetch from the feed and apply the outcome.
    ///
    /// Fetch errors are logged and recorded as a failed fetch; they never
    /// stop the loop.
    pub async fn refresh(&mut self, now_ms: u64) {
        match self.feed.fetch().await {
            Ok(result) => {
                let reconnected = !self.state.last_fetch_ok;
                self.state.last_fetch_ok = true;
                self.last_success = Some(Utc::now());

                match result {
                    FetchResult::Updated(lines) => {
                        let report = self.apply_reports(&lines);
                        info!(
                            feed = self.feed.name(),
                            reports = lines.len(),
                            updated = report.updated,
                            unmatched = report.unmatched.len(),
                            stale = report.stale,
                            "Reports updated"
                        );
                    }
                    FetchResult::Unchanged => {
                        debug!(feed = self.feed.name(), "Reports unchanged");
                        if reconnected {
                            self.engine.update_base(&self.registry, &self.state);
                        }
                    }
                }

                if reconnected {
                    self.engine.start_sweep(now_ms);
                }
            }
            Err(e) => {
                warn!(feed = self.feed.name(), error = %e, "Fetch failed");
                self.state.last_fetch_ok = false;
                self.engine.update_base(&self.registry, &self.state);
                self.engine.start_pulse(now_ms);
            }
        }
    }

    /// Advance the animations and show the frame if it changed.
    ///
    /// Returns whether a frame was shown.
    ///
    /// # Errors
    ///
    /// Returns an error if the renderer rejects the frame.
    pub fn tick(&mut self, now_ms: u64, rng: &mut impl Rng) -> Result<bool> {
        let Some(frame) = self.engine.tick(now_ms, &self.state, rng) else {
            return Ok(false);
        };
        self.renderer.show(&frame)?;
        self.frames_shown += 1;
        Ok(true)
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Run until `shutdown` resolves.
    ///
    /// The first fetch happens immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the renderer cannot be released at shutdown.
    pub async fn run<S>(&mut self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut rng = SmallRng::from_os_rng();
        let mut fetch = tokio::time::interval(self.fetch_interval);
        fetch.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tick = tokio::time::interval(self.tick_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            feed = self.feed.name(),
            renderer = self.renderer.name(),
            slots = self.registry.len(),
            fetch_interval_secs = self.fetch_interval.as_secs(),
            "Display loop started"
        );

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!(frames = self.frames_shown, "Shutting down display loop");
                    break;
                }
                _ = fetch.tick() => {
                    let now = self.now_ms();
                    self.refresh(now).await;
                }
                _ = tick.tick() => {
                    let now = self.now_ms();
                    if let Err(e) = self.tick(now, &mut rng) {
                        warn!(renderer = self.renderer.name(), error = %e, "Failed to show frame");
                    }
                }
            }
        }

        self.renderer.finish()
    }
}
