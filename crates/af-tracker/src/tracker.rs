//! Run Status Tracker - Polls the backend runner until a run settles
//!
//! A three-state machine over {idle, polling, settled} keyed by one run id.
//! The poll task's sequential fetch-then-sleep loop is the in-flight guard:
//! a new poll is never issued before the previous fetch resolves, so a stale
//! slow response cannot overwrite a later one.

use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use af_client::WorkflowRunner;
use af_core::TrackerConfig;
use af_graph::{RunStatus, WorkflowRun};

/// Phase of the tracker state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    /// No run is being tracked
    Idle,
    /// Fetching status on an interval
    Polling,
    /// A terminal status was observed; no further fetches are scheduled
    Settled,
}

/// Event emitted when tracker state changes
#[derive(Clone, Debug)]
pub enum TrackerEvent {
    /// Tracking started for a run id
    Started(String),
    /// A status observation was applied
    StatusObserved(String, RunStatus),
    /// A fetch failed; polling continues on the next tick
    FetchFailed(String, String),
    /// A terminal status was observed and polling stopped
    Settled(String, RunStatus),
    /// The tracked run id was cleared
    Cleared,
}

/// Point-in-time view of the tracker
#[derive(Debug, Clone)]
pub struct TrackerSnapshot {
    /// Current phase
    pub phase: TrackerPhase,
    /// Run id being tracked, if any
    pub run_id: Option<String>,
    /// Most recent run record observed; retained for display after settling
    pub last_run: Option<WorkflowRun>,
    /// Most recent fetch error, cleared by a later successful fetch
    pub last_error: Option<String>,
    /// Number of fetches issued for the current run id
    pub polls_issued: u64,
}

struct TrackerState {
    phase: TrackerPhase,
    run_id: Option<String>,
    last_run: Option<WorkflowRun>,
    last_error: Option<String>,
    polls_issued: u64,
}

impl TrackerState {
    fn idle() -> Self {
        Self {
            phase: TrackerPhase::Idle,
            run_id: None,
            last_run: None,
            last_error: None,
            polls_issued: 0,
        }
    }
}

struct PollTask {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Tracks one in-flight run by polling the runner's status endpoint
#[derive(Clone)]
pub struct RunStatusTracker {
    client: Arc<dyn WorkflowRunner>,
    config: TrackerConfig,
    state: Arc<RwLock<TrackerState>>,
    event_sender: broadcast::Sender<TrackerEvent>,
    task: Arc<Mutex<Option<PollTask>>>,
}

impl RunStatusTracker {
    /// Create a new tracker over the given runner client
    pub fn new(client: Arc<dyn WorkflowRunner>, config: TrackerConfig) -> Self {
        let (tx, _) = broadcast::channel(config.event_capacity);
        Self {
            client,
            config,
            state: Arc::new(RwLock::new(TrackerState::idle())),
            event_sender: tx,
            task: Arc::new(Mutex::new(None)),
        }
    }

    /// Subscribe to tracker events
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.event_sender.subscribe()
    }

    /// Start tracking a run id.
    ///
    /// Any previous poll task is canceled first; its pending timer or fetch
    /// is dropped without applying an observation. The new task fetches once
    /// immediately, then on the configured interval until a terminal status.
    #[instrument(skip(self))]
    pub async fn watch_run(&self, run_id: &str) {
        self.cancel_task().await;

        {
            let mut state = self.state.write().await;
            *state = TrackerState::idle();
            state.phase = TrackerPhase::Polling;
            state.run_id = Some(run_id.to_string());
        }

        info!(run_id = %run_id, "Tracking run");
        let _ = self
            .event_sender
            .send(TrackerEvent::Started(run_id.to_string()));

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(poll_loop(
            Arc::clone(&self.client),
            self.config.poll_interval,
            run_id.to_string(),
            Arc::clone(&self.state),
            self.event_sender.clone(),
            cancel_rx,
        ));

        let mut task = self.task.lock().await;
        *task = Some(PollTask {
            cancel: cancel_tx,
            handle,
        });
    }

    /// Stop tracking and reset to idle.
    #[instrument(skip(self))]
    pub async fn clear(&self) {
        self.cancel_task().await;

        let mut state = self.state.write().await;
        *state = TrackerState::idle();

        info!("Tracker cleared");
        let _ = self.event_sender.send(TrackerEvent::Cleared);
    }

    async fn cancel_task(&self) {
        let mut task = self.task.lock().await;
        if let Some(task) = task.take() {
            let _ = task.cancel.send(true);
            task.handle.abort();
        }
    }

    /// Current view of the tracker
    pub async fn snapshot(&self) -> TrackerSnapshot {
        let state = self.state.read().await;
        TrackerSnapshot {
            phase: state.phase,
            run_id: state.run_id.clone(),
            last_run: state.last_run.clone(),
            last_error: state.last_error.clone(),
            polls_issued: state.polls_issued,
        }
    }

    /// Whether the tracked run is still being polled
    pub async fn is_running(&self) -> bool {
        self.state.read().await.phase == TrackerPhase::Polling
    }

    /// Wait until the tracked run settles, returning its terminal status.
    ///
    /// Returns None if the tracker is cleared (or never started) before a
    /// terminal status is observed.
    pub async fn wait_settled(&self) -> Option<RunStatus> {
        let mut events = self.subscribe();

        {
            let state = self.state.read().await;
            match state.phase {
                TrackerPhase::Settled => {
                    return state.last_run.as_ref().map(|run| run.status);
                }
                TrackerPhase::Idle => return None,
                TrackerPhase::Polling => {}
            }
        }

        loop {
            match events.recv().await {
                Ok(TrackerEvent::Settled(_, status)) => return Some(status),
                Ok(TrackerEvent::Cleared) => return None,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// The polling loop for one run id.
///
/// Observations are applied in fetch-completion order; the next tick is not
/// scheduled until the previous fetch resolves.
async fn poll_loop(
    client: Arc<dyn WorkflowRunner>,
    interval: std::time::Duration,
    run_id: String,
    state: Arc<RwLock<TrackerState>>,
    events: broadcast::Sender<TrackerEvent>,
    mut cancel: watch::Receiver<bool>,
) {
    loop {
        {
            let mut state = state.write().await;
            state.polls_issued += 1;
        }

        let fetched = tokio::select! {
            _ = cancel.changed() => break,
            result = client.get_execution_status(&run_id) => result,
        };

        match fetched {
            Ok(run) => {
                let status = run.status;
                {
                    let mut state = state.write().await;
                    state.last_run = Some(run);
                    state.last_error = None;
                    if status.is_terminal() {
                        state.phase = TrackerPhase::Settled;
                    }
                }

                let _ = events.send(TrackerEvent::StatusObserved(run_id.clone(), status));

                if status.is_terminal() {
                    info!(run_id = %run_id, status = %status, "Run settled");
                    let _ = events.send(TrackerEvent::Settled(run_id.clone(), status));
                    break;
                }
            }
            Err(e) => {
                // Transient: record the observation and retry on the next tick.
                warn!(run_id = %run_id, error = %e, "Status fetch failed");
                {
                    let mut state = state.write().await;
                    state.last_error = Some(e.to_string());
                }
                let _ = events.send(TrackerEvent::FetchFailed(run_id.clone(), e.to_string()));
            }
        }

        tokio::select! {
            _ = cancel.changed() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
