//! Test doubles shared by the engine tests: a recording backend, a map-based
//! prober, a virtual clock and a tiny WAV writer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::audio::{AudioBackend, AudioError};
use crate::library::{DurationProbe, Track};
use crate::session::Clock;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(PathBuf, f32),
    Play,
    Stop,
    SetVolume(f32),
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    calls: Arc<Mutex<Vec<Call>>>,
    reject: Arc<Mutex<Option<PathBuf>>>,
    busy: Arc<AtomicBool>,
}

impl FakeBackend {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn loads(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Load(p, _) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn stop_count(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::Stop).count()
    }

    /// Make `load` fail for `path`.
    pub fn reject(&self, path: impl Into<PathBuf>) {
        *self.reject.lock().unwrap() = Some(path.into());
    }
}

impl AudioBackend for FakeBackend {
    fn load(&mut self, path: &Path, volume: f32) -> Result<(), AudioError> {
        if self.reject.lock().unwrap().as_deref() == Some(path) {
            return Err(AudioError::Decode {
                path: path.to_path_buf(),
                message: "unsupported codec".to_string(),
            });
        }
        self.calls
            .lock()
            .unwrap()
            .push(Call::Load(path.to_path_buf(), volume));
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        self.calls.lock().unwrap().push(Call::Play);
        self.busy.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn stop(&mut self) {
        self.calls.lock().unwrap().push(Call::Stop);
        self.busy.store(false, Ordering::Relaxed);
    }

    fn set_volume(&mut self, volume: f32) {
        self.calls.lock().unwrap().push(Call::SetVolume(volume));
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Relaxed)
    }
}

/// Prober answering from a fixed path -> seconds table.
#[derive(Default)]
pub struct FakeProbe(HashMap<PathBuf, u64>);

impl FakeProbe {
    pub fn new(entries: &[(&str, u64)]) -> Self {
        Self(
            entries
                .iter()
                .map(|(p, s)| (PathBuf::from(p), *s))
                .collect(),
        )
    }
}

impl DurationProbe for FakeProbe {
    fn probe(&self, path: &Path) -> Option<u64> {
        self.0.get(path).copied()
    }
}

/// Clock whose `sleep` advances virtual time instead of waiting it out.
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
    real_pause: Duration,
}

impl ManualClock {
    /// Every `sleep` returns immediately.
    pub fn instant() -> Self {
        Self::with_real_pause(Duration::ZERO)
    }

    /// Every `sleep` also waits `real_pause` of real time, so a test thread
    /// can act while a session is mid-track.
    pub fn with_real_pause(real_pause: Duration) -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            real_pause,
        }
    }

    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap()
    }

    fn sleep(&self, d: Duration) {
        *self.offset.lock().unwrap() += d;
        if self.real_pause.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(self.real_pause);
        }
    }
}

pub fn track(path: &str) -> Track {
    Track {
        path: PathBuf::from(path),
        label: path.to_string(),
        duration_secs: 0,
    }
}

/// Write a mono 16-bit PCM WAV of `millis` milliseconds at 8 kHz.
pub fn write_wav(path: &Path, millis: u64) {
    let sample_rate: u32 = 8_000;
    let data_len = (sample_rate as u64 * 2 * millis / 1000) as u32;

    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(44 + data_len as usize, 0);

    std::fs::write(path, bytes).unwrap();
}
