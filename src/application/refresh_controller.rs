// Refresh controller - owns the fetch lifecycle of the dashboard
//
// One background task is the single writer of `DashboardState`. It issues a
// fetch on mount, on every poll tick, on manual refresh and on month change.
// Fetches may overlap; each carries a generation number and only the result
// of the most recently issued fetch is applied.
use crate::application::dashboard_source::DashboardSource;
use crate::application::error::{error_message, DashboardError, UNKNOWN_ERROR};
use crate::domain::snapshot::DashboardSnapshot;
use crate::infrastructure::config::RefreshSettings;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{sleep_until, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// What the view sees: the phase, the last good snapshot and the last error.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub phase: Phase,
    pub snapshot: Option<Arc<DashboardSnapshot>>,
    pub error: Option<String>,
    /// Generation of the last applied fetch result, 0 before the first one.
    pub generation: u64,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            snapshot: None,
            error: None,
            generation: 0,
        }
    }
}

impl DashboardState {
    /// Background refreshes keep the old snapshot on screen; the indicator is
    /// only for the very first load.
    pub fn show_loading_indicator(&self) -> bool {
        self.phase == Phase::Loading && self.snapshot.is_none()
    }
}

#[derive(Debug)]
enum Command {
    Refresh,
    SelectMonth(String),
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    Mount,
    Poll,
    Manual,
    MonthChange,
}

/// Handle to a running refresh loop. Dropping it cancels the poll timer and
/// every in-flight fetch.
pub struct RefreshController {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<DashboardState>,
    task: JoinHandle<()>,
}

impl RefreshController {
    /// Start the loop and issue the initial fetch. Must be called inside a
    /// Tokio runtime.
    pub fn spawn(source: Arc<dyn DashboardSource>, settings: RefreshSettings) -> Self {
        let (state_tx, state_rx) = watch::channel(DashboardState::default());
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        tracing::info!(
            interval_secs = settings.interval_secs,
            failure_backoff = settings.failure_backoff,
            "Dashboard refresh started"
        );

        let worker = Worker {
            source,
            settings,
            state: state_tx,
            commands: command_rx,
            fetches: JoinSet::new(),
            month: None,
            latest: 0,
            failures: 0,
        };

        Self {
            commands: command_tx,
            state: state_rx,
            task: tokio::spawn(worker.run()),
        }
    }

    pub fn refresh(&self) {
        let _ = self.commands.send(Command::Refresh);
    }

    /// Refetch for `month` and restart the poll schedule from now.
    pub fn select_month(&self, month: impl Into<String>) {
        let _ = self.commands.send(Command::SelectMonth(month.into()));
    }

    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.clone()
    }

    /// Cancel the loop and wait until it is gone.
    pub async fn shutdown(mut self) {
        self.task.abort();
        let _ = (&mut self.task).await;
        tracing::info!("Dashboard refresh stopped");
    }
}

impl Drop for RefreshController {
    fn drop(&mut self) {
        self.task.abort();
    }
}

type FetchResult = Result<Result<DashboardSnapshot, DashboardError>, Box<dyn Any + Send>>;

struct Worker {
    source: Arc<dyn DashboardSource>,
    settings: RefreshSettings,
    state: watch::Sender<DashboardState>,
    commands: mpsc::UnboundedReceiver<Command>,
    fetches: JoinSet<(u64, FetchResult)>,
    month: Option<String>,
    latest: u64,
    failures: u32,
}

impl Worker {
    async fn run(mut self) {
        // The poll delay is measured from when the schedule was last armed and
        // is recomputed whenever a result changes the failure count.
        self.start_fetch(Trigger::Mount);
        let mut armed_at = Instant::now();
        let mut next_poll = armed_at + self.poll_delay();

        loop {
            tokio::select! {
                _ = sleep_until(next_poll) => {
                    self.start_fetch(Trigger::Poll);
                    armed_at = Instant::now();
                    next_poll = armed_at + self.poll_delay();
                }
                command = self.commands.recv() => match command {
                    Some(Command::Refresh) => self.start_fetch(Trigger::Manual),
                    Some(Command::SelectMonth(month)) => {
                        self.month = Some(month);
                        self.start_fetch(Trigger::MonthChange);
                        armed_at = Instant::now();
                        next_poll = armed_at + self.poll_delay();
                    }
                    None => break,
                },
                Some(joined) = self.fetches.join_next() => {
                    if self.apply(joined) {
                        next_poll = armed_at + self.poll_delay();
                    }
                }
            }
        }

        tracing::debug!("Refresh controller handle dropped, stopping");
    }

    fn poll_delay(&self) -> Duration {
        next_poll_delay(&self.settings, self.failures)
    }

    fn start_fetch(&mut self, trigger: Trigger) {
        self.latest += 1;
        let generation = self.latest;
        let month = self.month.clone();

        tracing::debug!(
            generation,
            ?trigger,
            month = month.as_deref().unwrap_or("(server default)"),
            "Fetching dashboard"
        );

        self.state.send_modify(|s| s.phase = Phase::Loading);

        let source = self.source.clone();
        self.fetches.spawn(async move {
            let result = AssertUnwindSafe(source.fetch_snapshot(month.as_deref()))
                .catch_unwind()
                .await;
            (generation, result)
        });
    }

    /// Apply a finished fetch. Returns true when it was the latest one.
    fn apply(&mut self, joined: Result<(u64, FetchResult), JoinError>) -> bool {
        let (generation, result) = match joined {
            Ok(done) => done,
            Err(e) => {
                tracing::debug!("Dashboard fetch task did not complete: {}", e);
                return false;
            }
        };

        if generation != self.latest {
            tracing::debug!(generation, latest = self.latest, "Discarding stale dashboard response");
            return false;
        }

        match result {
            Ok(Ok(snapshot)) => {
                self.failures = 0;
                tracing::debug!(
                    generation,
                    month = %snapshot.selected_month,
                    last_updated = %snapshot.last_updated,
                    "Dashboard refreshed"
                );
                let snapshot = Arc::new(snapshot);
                self.state.send_modify(move |s| {
                    s.phase = Phase::Ready;
                    s.snapshot = Some(snapshot);
                    s.error = None;
                    s.generation = generation;
                });
            }
            Ok(Err(e)) => self.fail(generation, error_message(&e)),
            Err(_) => self.fail(generation, UNKNOWN_ERROR.to_string()),
        }
        true
    }

    fn fail(&mut self, generation: u64, message: String) {
        self.failures = self.failures.saturating_add(1);
        tracing::warn!(generation, failures = self.failures, "Dashboard refresh failed: {}", message);
        self.state.send_modify(move |s| {
            s.phase = Phase::Failed;
            s.error = Some(message);
            s.generation = generation;
        });
    }
}

/// Delay until the next poll. Without backoff this is always the configured
/// interval; with backoff it doubles per consecutive failure, capped.
/// Settings are range-checked when the configuration is loaded.
pub fn next_poll_delay(settings: &RefreshSettings, failures: u32) -> Duration {
    let base = Duration::from_secs(settings.interval_secs);
    if !settings.failure_backoff || failures == 0 {
        return base;
    }
    let cap = Duration::from_secs(settings.max_interval_secs).max(base);
    let factor = 2u32.saturating_pow(failures.min(16));
    base.saturating_mul(factor).min(cap)
}
