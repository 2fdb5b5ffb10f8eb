use std::thread;
use std::time::{Duration, Instant};

/// Time source for a playback session.
///
/// Progress is measured as `now() - start`, so a clock whose `sleep` advances
/// virtual time drives a session without waiting in real time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);
}

/// The monotonic system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, d: Duration) {
        thread::sleep(d);
    }
}
