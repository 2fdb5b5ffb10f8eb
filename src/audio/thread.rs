use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::{OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use super::sink::create_sink;
use super::types::{AudioCmd, AudioError};

/// How often the thread refreshes the busy flag when no command arrives.
const IDLE_POLL: Duration = Duration::from_millis(200);

/// Spawn the thread owning the output stream.
///
/// `ready` receives exactly one message: `Ok(())` once the default device is
/// open, or the device error (after which the thread exits).
pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    busy: Arc<AtomicBool>,
    ready: Sender<Result<(), AudioError>>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("fermata-audio".to_string())
        .spawn(move || {
            let mut stream = match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = ready.send(Err(AudioError::Device(e.to_string())));
                    return;
                }
            };
            // rodio logs to stderr when the stream is dropped, which would
            // scribble over the TUI.
            stream.log_on_drop(false);
            let _ = ready.send(Ok(()));

            let mut sink: Option<Sink> = None;

            loop {
                match rx.recv_timeout(IDLE_POLL) {
                    Ok(AudioCmd::Load {
                        path,
                        volume,
                        reply,
                    }) => {
                        if let Some(old) = sink.take() {
                            old.stop();
                        }
                        let result = match create_sink(&stream, &path, volume) {
                            Ok(new_sink) => {
                                debug!(path = %path.display(), "track loaded");
                                sink = Some(new_sink);
                                Ok(())
                            }
                            Err(e) => {
                                warn!(error = %e, "backend rejected track");
                                Err(e)
                            }
                        };
                        let _ = reply.send(result);
                    }
                    Ok(AudioCmd::Play) => {
                        if let Some(s) = sink.as_ref() {
                            s.play();
                        }
                    }
                    Ok(AudioCmd::Stop) => {
                        if let Some(s) = sink.take() {
                            s.stop();
                        }
                    }
                    Ok(AudioCmd::SetVolume(volume)) => {
                        if let Some(s) = sink.as_ref() {
                            s.set_volume(volume);
                        }
                    }
                    Ok(AudioCmd::Quit) | Err(RecvTimeoutError::Disconnected) => {
                        if let Some(s) = sink.take() {
                            s.stop();
                        }
                        break;
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                }

                let playing = sink.as_ref().is_some_and(|s| !s.empty() && !s.is_paused());
                busy.store(playing, Ordering::Relaxed);
            }

            busy.store(false, Ordering::Relaxed);
        })
}
