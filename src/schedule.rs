//! Time-triggered playback jobs.
//!
//! `time` parses the `H:M:S` text the user types, `job`/`board` hold the job
//! collection shared with the playback session, and `scheduler` is the
//! background loop that fires due jobs.

mod board;
mod job;
mod scheduler;
mod time;

pub use board::{JobBoard, JobList};
pub use job::{Job, JobId, JobStatus};
pub use scheduler::{Scheduler, SchedulerHandle};
pub use time::{TimeParseError, format_hms, next_occurrence, parse_duration, parse_time_of_day};

#[cfg(test)]
mod tests;
