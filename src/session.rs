//! Playback session: one "play for N seconds across an ordered track list"
//! run at a time.
//!
//! A run is started with [`Session::start`], executes on its own worker
//! thread and ends in exactly one teardown, whichever way it exits: budget
//! reached, tracks exhausted, [`Session::stop`], or a backend error. Each run
//! gets a fresh stop flag, so a flag raised for a finished run can never leak
//! into the next one.

mod clock;
mod run;

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::error;

use crate::audio::SharedPlayer;
use crate::library::{DurationProbe, Track};
use crate::schedule::{JobBoard, JobId};
use crate::sync::lock;

pub use clock::{Clock, SystemClock};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a playback session is already active")]
    Busy,
    #[error("no tracks to play")]
    NoTracks,
    #[error("failed to start the playback worker: {0}")]
    Spawn(#[from] io::Error),
}

/// Notifications for the UI about runs that ended on their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The run used up its budget or ran out of tracks.
    Completed,
    /// The backend rejected a track; the run was torn down.
    Failed(String),
}

/// Snapshot of the session for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStatus {
    pub active: bool,
    pub current_label: Option<String>,
    pub total_secs: u64,
    /// `total - elapsed`, never negative; zero once idle.
    pub remaining: Duration,
    pub stop_requested: bool,
}

impl SessionStatus {
    pub fn remaining_secs(&self) -> u64 {
        self.remaining.as_secs()
    }
}

struct ActiveRun {
    id: u64,
    stop: Arc<AtomicBool>,
    /// The job that started this run, completed on teardown.
    owner: Option<JobId>,
}

#[derive(Default)]
struct SessionState {
    status: SessionStatus,
    run: Option<ActiveRun>,
    last_run_id: u64,
}

struct Inner {
    state: Mutex<SessionState>,
    player: SharedPlayer,
    probe: Arc<dyn DurationProbe>,
    clock: Arc<dyn Clock>,
    jobs: JobBoard,
    events: Sender<SessionEvent>,
    poll_interval: Duration,
}

/// Cheap-to-clone handle to the single playback session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    pub fn new(
        player: SharedPlayer,
        probe: Arc<dyn DurationProbe>,
        clock: Arc<dyn Clock>,
        jobs: JobBoard,
        events: Sender<SessionEvent>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SessionState::default()),
                player,
                probe,
                clock,
                jobs,
                events,
                poll_interval,
            }),
        }
    }

    /// Start playing `tracks` in order for `total_secs` seconds.
    ///
    /// Returns immediately; the run continues on a worker thread. Rejected
    /// with [`SessionError::Busy`] while another run is active, leaving that
    /// run untouched. `owner` is the job to mark completed when the run ends.
    pub fn start(
        &self,
        tracks: Vec<Track>,
        total_secs: u64,
        owner: Option<JobId>,
    ) -> Result<(), SessionError> {
        if tracks.is_empty() {
            return Err(SessionError::NoTracks);
        }

        let (run_id, stop) = {
            let mut state = lock(&self.inner.state);
            if state.status.active {
                return Err(SessionError::Busy);
            }
            state.last_run_id += 1;
            let run_id = state.last_run_id;
            let stop = Arc::new(AtomicBool::new(false));
            state.run = Some(ActiveRun {
                id: run_id,
                stop: stop.clone(),
                owner,
            });
            state.status = SessionStatus {
                active: true,
                current_label: None,
                total_secs,
                remaining: Duration::from_secs(total_secs),
                stop_requested: false,
            };
            (run_id, stop)
        };

        let session = self.clone();
        let spawned = thread::Builder::new()
            .name(format!("fermata-session-{run_id}"))
            .spawn(move || session.run(run_id, stop, tracks, total_secs));

        if let Err(e) = spawned {
            error!(error = %e, "failed to spawn playback worker");
            self.abort_start(run_id);
            return Err(SessionError::Spawn(e));
        }
        Ok(())
    }

    /// Undo a run whose worker never came up.
    ///
    /// The owning job is left to the caller, which may be holding the job
    /// board lock right now.
    fn abort_start(&self, run_id: u64) {
        if let Some(run) = lock(&self.inner.state)
            .run
            .as_mut()
            .filter(|run| run.id == run_id)
        {
            run.owner = None;
        }
        self.teardown(Some(run_id));
    }

    /// Stop the active run, if any. Idempotent.
    pub fn stop(&self) {
        self.teardown(None);
    }

    pub fn status(&self) -> SessionStatus {
        let state = lock(&self.inner.state);
        let mut status = state.status.clone();
        if let Some(run) = &state.run {
            status.stop_requested = run.stop.load(Ordering::SeqCst);
        }
        status
    }

    pub fn is_active(&self) -> bool {
        lock(&self.inner.state).status.active
    }

    pub(crate) fn notify(&self, event: SessionEvent) {
        let _ = self.inner.events.send(event);
    }

    /// End the run `run_id` (or whichever run is active, for `None`).
    ///
    /// Raises the run's stop flag, silences the backend, zeroes the progress
    /// and completes the owning job. The owner link is taken out of the state
    /// first, so repeated calls and calls on behalf of a run that has already
    /// been replaced change nothing.
    fn teardown(&self, run_id: Option<u64>) {
        let owner = {
            let mut state = lock(&self.inner.state);
            let Some(run) = state
                .run
                .take_if(|run| run_id.is_none_or(|id| id == run.id))
            else {
                return;
            };

            run.stop.store(true, Ordering::SeqCst);
            state.status.active = false;
            state.status.stop_requested = true;
            state.status.remaining = Duration::ZERO;
            state.status.current_label = None;

            // Still under the state lock: a new run cannot load a track
            // between the check above and this stop.
            lock(&self.inner.player).stop();
            run.owner
        };

        if let Some(job) = owner {
            self.inner.jobs.complete(job);
        }
    }

    fn with_current_run(&self, run_id: u64, f: impl FnOnce(&mut SessionStatus)) {
        let mut state = lock(&self.inner.state);
        if state.run.as_ref().is_some_and(|run| run.id == run_id) {
            f(&mut state.status);
        }
    }
}
