use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local};

use super::job::{Job, JobId, JobStatus};
use crate::sync::lock;

/// The job collection. Jobs keep their insertion order; ids are never reused.
#[derive(Debug, Default)]
pub struct JobList {
    jobs: Vec<Job>,
    last_id: JobId,
}

impl JobList {
    pub fn push(&mut self, target: DateTime<Local>, duration_secs: u64) -> Job {
        self.last_id += 1;
        let job = Job {
            id: self.last_id,
            target,
            duration_secs,
            status: JobStatus::Pending,
        };
        self.jobs.push(job.clone());
        job
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    /// Ids of the jobs due at `now`, earliest target first (ties by id).
    pub fn due(&self, now: DateTime<Local>) -> Vec<JobId> {
        let mut due: Vec<&Job> = self.jobs.iter().filter(|j| j.is_due(now)).collect();
        due.sort_by_key(|j| (j.target, j.id));
        due.into_iter().map(|j| j.id).collect()
    }

    /// `Pending -> Running`. Returns whether the transition happened.
    pub fn mark_running(&mut self, id: JobId) -> bool {
        self.transition(id, JobStatus::Pending, JobStatus::Running)
    }

    /// `Running -> Completed`. Returns whether the transition happened.
    pub fn mark_completed(&mut self, id: JobId) -> bool {
        self.transition(id, JobStatus::Running, JobStatus::Completed)
    }

    fn transition(&mut self, id: JobId, from: JobStatus, to: JobStatus) -> bool {
        match self.jobs.iter_mut().find(|j| j.id == id) {
            Some(job) if job.status == from => {
                job.status = to;
                true
            }
            _ => false,
        }
    }

    /// Drop every completed job. Returns how many were removed.
    pub fn sweep(&mut self) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|j| j.status != JobStatus::Completed);
        before - self.jobs.len()
    }
}

/// Shared handle to the [`JobList`], cloned into the scheduler and the
/// playback session.
#[derive(Debug, Clone, Default)]
pub struct JobBoard {
    inner: Arc<Mutex<JobList>>,
}

impl JobBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, target: DateTime<Local>, duration_secs: u64) -> Job {
        self.lock().push(target, duration_secs)
    }

    pub fn snapshot(&self) -> Vec<Job> {
        self.lock().jobs().to_vec()
    }

    pub fn complete(&self, id: JobId) -> bool {
        self.lock().mark_completed(id)
    }

    /// Hold the list for a multi-step update.
    pub fn lock(&self) -> MutexGuard<'_, JobList> {
        lock(&self.inner)
    }
}
