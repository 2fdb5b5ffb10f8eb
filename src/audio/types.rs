//! Audio-related small types.
//!
//! This module defines the commands understood by the audio thread and the
//! error type shared by every backend.

use std::path::PathBuf;
use std::sync::mpsc::Sender;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path:?}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("no audio output device: {0}")]
    Device(String),
    #[error("audio thread is not running")]
    Disconnected,
}

#[derive(Debug)]
pub(super) enum AudioCmd {
    /// Replace the current sink with `path`, paused, at `volume`.
    Load {
        path: PathBuf,
        volume: f32,
        reply: Sender<Result<(), AudioError>>,
    },
    /// Start (or resume) the loaded sink.
    Play,
    /// Stop and drop the current sink.
    Stop,
    /// Apply a volume to the current sink.
    SetVolume(f32),
    /// Stop output and exit the audio thread.
    Quit,
}
