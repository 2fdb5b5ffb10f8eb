use std::path::Path;
use std::sync::{Arc, Mutex};

use super::types::AudioError;

/// A single-track audio output device.
///
/// Implementations only need to honour the raw operations; volume clamping,
/// the volume baseline and stop idempotence live in [`AudioPlayer`].
pub trait AudioBackend: Send {
    /// Replace whatever is loaded with `path`, paused, at `volume`.
    fn load(&mut self, path: &Path, volume: f32) -> Result<(), AudioError>;
    /// Start output of the loaded track from its beginning.
    fn play(&mut self) -> Result<(), AudioError>;
    fn stop(&mut self);
    fn set_volume(&mut self, volume: f32);
    /// Whether the device is currently producing sound.
    fn is_busy(&self) -> bool;
}

pub type SharedPlayer = Arc<Mutex<AudioPlayer>>;

/// Adapter over an [`AudioBackend`] that remembers the output volume.
pub struct AudioPlayer {
    backend: Box<dyn AudioBackend>,
    volume: f32,
    loaded: bool,
}

impl AudioPlayer {
    pub fn new(backend: Box<dyn AudioBackend>, volume: f32) -> Self {
        Self {
            backend,
            volume: clamp_volume(volume),
            loaded: false,
        }
    }

    pub fn shared(self) -> SharedPlayer {
        Arc::new(Mutex::new(self))
    }

    /// Load `path` at the current volume baseline.
    ///
    /// A rejected load keeps whatever was loaded before, so a later `stop`
    /// still reaches the backend.
    pub fn load(&mut self, path: &Path) -> Result<(), AudioError> {
        self.backend.load(path, self.volume)?;
        self.loaded = true;
        Ok(())
    }

    pub fn play(&mut self) -> Result<(), AudioError> {
        self.backend.play()
    }

    /// Halt output. A no-op when nothing is loaded.
    pub fn stop(&mut self) {
        if !self.loaded {
            return;
        }
        self.backend.stop();
        self.loaded = false;
    }

    /// Clamp `volume` to `[0.0, 1.0]`, keep it as the new baseline and apply it.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
        self.backend.set_volume(self.volume);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_busy(&self) -> bool {
        self.backend.is_busy()
    }
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}
