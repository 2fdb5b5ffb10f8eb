use std::fmt;

use chrono::{DateTime, Local};

pub type JobId = u64;

/// Lifecycle of a job: `Pending -> Running -> Completed`, each step once.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
        })
    }
}

/// A scheduled playback request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    /// When the job should fire.
    pub target: DateTime<Local>,
    /// Playback budget once it fires.
    pub duration_secs: u64,
    pub status: JobStatus,
}

impl Job {
    /// Pending and at or past its target.
    pub fn is_due(&self, now: DateTime<Local>) -> bool {
        self.status == JobStatus::Pending && self.target <= now
    }
}
