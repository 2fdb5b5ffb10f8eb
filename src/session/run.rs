use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{Session, SessionEvent};
use crate::audio::AudioError;
use crate::library::Track;
use crate::sync::lock;

impl Session {
    /// Worker body of run `run_id`.
    pub(super) fn run(
        &self,
        run_id: u64,
        stop: Arc<AtomicBool>,
        tracks: Vec<Track>,
        total_secs: u64,
    ) {
        info!(run = run_id, tracks = tracks.len(), total_secs, "playback started");

        let result = self.play_sequence(run_id, &stop, &tracks, total_secs);
        let stopped = stop.load(Ordering::SeqCst);
        self.teardown(Some(run_id));

        match result {
            Ok(()) if stopped => info!(run = run_id, "playback stopped"),
            Ok(()) => {
                info!(run = run_id, "playback finished");
                self.notify(SessionEvent::Completed);
            }
            Err(e) => {
                warn!(run = run_id, error = %e, "playback aborted");
                self.notify(SessionEvent::Failed(e.to_string()));
            }
        }
    }

    /// Play `tracks` back to back until `total_secs` have elapsed, the list
    /// runs out or `stop` is raised.
    ///
    /// Progress is wall-clock based: each track gets a span of
    /// `min(duration, budget left)` and the wait for it ends once
    /// `now - start` reaches the cumulative target.
    fn play_sequence(
        &self,
        run_id: u64,
        stop: &AtomicBool,
        tracks: &[Track],
        total_secs: u64,
    ) -> Result<(), AudioError> {
        let inner = &self.inner;
        let total = Duration::from_secs(total_secs);
        let started = inner.clock.now();
        let mut played = Duration::ZERO;

        for track in tracks {
            if stop.load(Ordering::SeqCst) || played >= total {
                break;
            }

            let Some(secs) = inner.probe.probe(&track.path).filter(|&s| s > 0) else {
                debug!(path = %track.path.display(), "skipping unplayable track");
                continue;
            };
            let span = Duration::from_secs(secs).min(total - played);

            self.with_current_run(run_id, |status| {
                status.current_label = Some(track.label.clone());
            });

            {
                let mut player = lock(&inner.player);
                // Checked under the player lock: once teardown has raised the
                // flag this run never touches the device again.
                if stop.load(Ordering::SeqCst) {
                    break;
                }
                player.load(&track.path)?;
                player.play()?;
            }
            debug!(run = run_id, track = %track.label, span_secs = span.as_secs(), "track started");

            let target = played + span;
            loop {
                if stop.load(Ordering::SeqCst) {
                    return Ok(());
                }
                let elapsed = inner.clock.now().saturating_duration_since(started);
                self.with_current_run(run_id, |status| {
                    status.remaining = total.saturating_sub(elapsed);
                });
                if elapsed >= target {
                    break;
                }
                inner.clock.sleep(inner.poll_interval);
            }

            played = target;
        }

        Ok(())
    }
}
