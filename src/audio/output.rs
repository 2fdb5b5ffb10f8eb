use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

use super::player::AudioBackend;
use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, AudioError};

/// [`AudioBackend`] backed by `rodio` on the default output device.
///
/// The output stream lives on a dedicated thread; this handle only sends
/// commands to it. `load` waits for the thread's answer so decode errors come
/// back to the caller.
pub struct RodioOutput {
    tx: Sender<AudioCmd>,
    busy: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl RodioOutput {
    /// Open the default output device.
    pub fn open() -> Result<Self, AudioError> {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let busy = Arc::new(AtomicBool::new(false));

        let join = spawn_audio_thread(rx, busy.clone(), ready_tx)
            .map_err(|e| AudioError::Device(e.to_string()))?;
        ready_rx.recv().map_err(|_| AudioError::Disconnected)??;

        Ok(Self {
            tx,
            busy,
            join: Some(join),
        })
    }

    fn send(&self, cmd: AudioCmd) -> Result<(), AudioError> {
        self.tx.send(cmd).map_err(|_| AudioError::Disconnected)
    }
}

impl AudioBackend for RodioOutput {
    fn load(&mut self, path: &Path, volume: f32) -> Result<(), AudioError> {
        let (reply, answer) = mpsc::channel();
        self.send(AudioCmd::Load {
            path: path.to_path_buf(),
            volume,
            reply,
        })?;
        answer.recv().map_err(|_| AudioError::Disconnected)?
    }

    fn play(&mut self) -> Result<(), AudioError> {
        self.send(AudioCmd::Play)
    }

    fn stop(&mut self) {
        let _ = self.send(AudioCmd::Stop);
    }

    fn set_volume(&mut self, volume: f32) {
        let _ = self.send(AudioCmd::SetVolume(volume));
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Relaxed)
    }
}

impl Drop for RodioOutput {
    fn drop(&mut self) {
        let _ = self.send(AudioCmd::Quit);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}
