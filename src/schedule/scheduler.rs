use std::io;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{debug, error, info, warn};

use super::board::{JobBoard, JobList};
use super::job::JobId;
use crate::library::SharedLibrary;
use crate::session::{Session, SessionError, SessionEvent};
use crate::sync::lock;

/// Fires due jobs into the playback session.
///
/// `tick` is the whole policy; `spawn` only calls it periodically.
#[derive(Clone)]
pub struct Scheduler {
    jobs: JobBoard,
    session: Session,
    library: SharedLibrary,
}

impl Scheduler {
    pub fn new(jobs: JobBoard, session: Session, library: SharedLibrary) -> Self {
        Self {
            jobs,
            session,
            library,
        }
    }

    /// One scheduler pass at wall-clock time `now`.
    ///
    /// At most one job fires per tick: the due job with the earliest target
    /// (lowest id on ties). While a session is active every due job stays
    /// pending and is retried on a later tick. Completed jobs are swept at
    /// the end. Returns the id of the job that fired, if any.
    pub fn tick(&self, now: DateTime<Local>) -> Option<JobId> {
        let mut jobs = self.jobs.lock();

        let due = jobs.due(now);
        let fired = match due.first() {
            Some(&id) => self.fire(&mut jobs, id, due.len()),
            None => None,
        };

        let swept = jobs.sweep();
        if swept > 0 {
            debug!(swept, "swept completed jobs");
        }
        fired
    }

    fn fire(&self, jobs: &mut JobList, id: JobId, due: usize) -> Option<JobId> {
        if self.session.is_active() {
            debug!(due, "session busy, deferring due jobs");
            return None;
        }

        let duration_secs = jobs.get(id)?.duration_secs;
        // The live library at fire time, not the one seen when the job was added.
        let tracks = lock(&self.library).tracks().to_vec();

        match self.session.start(tracks, duration_secs, Some(id)) {
            Ok(()) => {
                jobs.mark_running(id);
                info!(job = id, duration_secs, "scheduled job fired");
                Some(id)
            }
            Err(SessionError::Busy) => {
                debug!(job = id, "session became busy, deferring");
                None
            }
            Err(e) => {
                jobs.mark_running(id);
                jobs.mark_completed(id);
                warn!(job = id, error = %e, "scheduled job could not start");
                self.session
                    .notify(SessionEvent::Failed(format!("scheduled job #{id}: {e}")));
                Some(id)
            }
        }
    }

    /// Run `tick` every `period` on a background thread until the returned
    /// handle is stopped or dropped.
    pub fn spawn(self, period: Duration) -> io::Result<SchedulerHandle> {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let join = thread::Builder::new()
            .name("fermata-scheduler".to_string())
            .spawn(move || {
                info!(period_ms = period.as_millis() as u64, "scheduler started");
                loop {
                    let result = catch_unwind(AssertUnwindSafe(|| self.tick(Local::now())));
                    if result.is_err() {
                        error!("scheduler tick panicked; continuing");
                    }

                    match shutdown_rx.recv_timeout(period) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!("scheduler stopped");
            })?;

        Ok(SchedulerHandle {
            shutdown: Some(shutdown_tx),
            join: Some(join),
        })
    }
}

/// Owns the scheduler thread; stops and joins it on drop.
pub struct SchedulerHandle {
    shutdown: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    pub fn is_running(&self) -> bool {
        self.join.as_ref().is_some_and(|j| !j.is_finished())
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
