//! Control surface: the operations the UI calls and the state it reads.
//!
//! The [`Controller`] owns the whole engine context (library, job board,
//! playback session, audio player and the scheduler thread) and hands the
//! background parts cloned handles to the pieces they share.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::{info, warn};

use crate::audio::{AudioBackend, AudioPlayer, SharedPlayer};
use crate::config::{LibrarySettings, Settings};
use crate::library::{self, DurationProbe, Library, SharedLibrary, Track};
use crate::schedule::{
    Job, JobBoard, Scheduler, SchedulerHandle, TimeParseError, next_occurrence, parse_duration,
    parse_time_of_day,
};
use crate::session::{Clock, Session, SessionError, SessionEvent, SessionStatus};
use crate::sync::lock;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("no supported audio files in {}", .0.display())]
    NoSupportedFiles(PathBuf),
    #[error("no library loaded; scan a folder first")]
    NoLibrary,
    #[error("already playing; stop first")]
    AlreadyPlaying,
    #[error(transparent)]
    Parse(#[from] TimeParseError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// What a scan reports back per track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSummary {
    pub label: String,
    pub duration_secs: u64,
}

impl From<&Track> for TrackSummary {
    fn from(track: &Track) -> Self {
        Self {
            label: track.label.clone(),
            duration_secs: track.duration_secs,
        }
    }
}

pub struct Controller {
    library: SharedLibrary,
    jobs: JobBoard,
    session: Session,
    player: SharedPlayer,
    events: Receiver<SessionEvent>,
    library_settings: LibrarySettings,
    scheduler: Option<SchedulerHandle>,
}

impl Controller {
    pub fn new(
        backend: Box<dyn AudioBackend>,
        probe: Arc<dyn DurationProbe>,
        clock: Arc<dyn Clock>,
        settings: &Settings,
    ) -> Self {
        let volume = f32::from(settings.audio.initial_volume.min(100)) / 100.0;
        let player = AudioPlayer::new(backend, volume).shared();
        let jobs = JobBoard::new();
        let (events_tx, events) = mpsc::channel();

        let session = Session::new(
            player.clone(),
            probe,
            clock,
            jobs.clone(),
            events_tx,
            Duration::from_millis(settings.session.poll_interval_ms.max(1)),
        );

        Self {
            library: Arc::new(Mutex::new(Library::new())),
            jobs,
            session,
            player,
            events,
            library_settings: settings.library.clone(),
            scheduler: None,
        }
    }

    /// A scheduler over this controller's jobs, session and library.
    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(
            self.jobs.clone(),
            self.session.clone(),
            self.library.clone(),
        )
    }

    /// Start the background scheduler thread. A second call is a no-op.
    pub fn start_scheduler(&mut self, period: Duration) -> io::Result<()> {
        if self.scheduler.as_ref().is_some_and(SchedulerHandle::is_running) {
            return Ok(());
        }
        self.scheduler = Some(self.scheduler().spawn(period)?);
        Ok(())
    }

    pub fn scheduler_running(&self) -> bool {
        self.scheduler.as_ref().is_some_and(SchedulerHandle::is_running)
    }

    /// Scan `path` and make the result the new library.
    ///
    /// When nothing playable is found the previous library stays in place.
    pub fn scan_folder(&self, path: &Path) -> Result<Vec<TrackSummary>, ControlError> {
        let tracks = library::scan(path, &self.library_settings);
        if tracks.is_empty() {
            warn!(folder = %path.display(), "scan found no supported files");
            return Err(ControlError::NoSupportedFiles(path.to_path_buf()));
        }

        let summaries: Vec<TrackSummary> = tracks.iter().map(TrackSummary::from).collect();
        info!(folder = %path.display(), tracks = tracks.len(), "library loaded");
        lock(&self.library).replace(path, tracks);
        Ok(summaries)
    }

    /// Schedule playback at the next occurrence of `time` (`H:M:S`) for
    /// `duration` (`H:M:S` or `M:S`).
    pub fn add_schedule(&self, time: &str, duration: &str) -> Result<Job, ControlError> {
        self.add_schedule_at(Local::now(), time, duration)
    }

    pub(crate) fn add_schedule_at(
        &self,
        now: DateTime<Local>,
        time: &str,
        duration: &str,
    ) -> Result<Job, ControlError> {
        let at = parse_time_of_day(time)?;
        let duration_secs = parse_duration(duration)?;
        if lock(&self.library).is_empty() {
            return Err(ControlError::NoLibrary);
        }

        let job = self.jobs.add(next_occurrence(now, at), duration_secs);
        info!(job = job.id, target = %job.target, duration_secs, "playback scheduled");
        Ok(job)
    }

    /// Start playing the library right away for `duration`.
    pub fn play_now(&self, duration: &str) -> Result<(), ControlError> {
        let tracks = lock(&self.library).tracks().to_vec();
        if tracks.is_empty() {
            return Err(ControlError::NoLibrary);
        }
        if self.session.is_active() {
            return Err(ControlError::AlreadyPlaying);
        }
        let duration_secs = parse_duration(duration)?;

        match self.session.start(tracks, duration_secs, None) {
            Ok(()) => Ok(()),
            Err(SessionError::Busy) => Err(ControlError::AlreadyPlaying),
            Err(e) => Err(e.into()),
        }
    }

    pub fn stop(&self) {
        self.session.stop();
    }

    /// Set the output volume in percent; values above 100 are clamped.
    pub fn set_volume(&self, percent: u32) {
        let percent = percent.min(100);
        lock(&self.player).set_volume(percent as f32 / 100.0);
    }

    /// Current output volume in percent.
    pub fn volume(&self) -> u8 {
        (lock(&self.player).volume() * 100.0).round() as u8
    }

    /// Whether the output device is producing sound right now.
    pub fn output_busy(&self) -> bool {
        lock(&self.player).is_busy()
    }

    pub fn reorder(&self, index: usize, direction: isize) -> bool {
        lock(&self.library).reorder(index, direction)
    }

    pub fn delete(&self, index: usize) -> Option<Track> {
        lock(&self.library).delete(index)
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.snapshot()
    }

    pub fn tracks(&self) -> Vec<Track> {
        lock(&self.library).tracks().to_vec()
    }

    pub fn folder(&self) -> Option<PathBuf> {
        lock(&self.library).folder().map(Path::to_path_buf)
    }

    /// Session events that arrived since the last call.
    pub fn take_events(&self) -> Vec<SessionEvent> {
        self.events.try_iter().collect()
    }

    /// Stop the scheduler thread and any running session.
    pub fn shutdown(&mut self) {
        if let Some(mut handle) = self.scheduler.take() {
            handle.stop();
        }
        self.session.stop();
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.shutdown();
    }
}
