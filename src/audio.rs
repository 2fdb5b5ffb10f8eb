//! Audio output: the backend seam, the volume-aware adapter the playback
//! session drives, and the `rodio` implementation running on its own thread.

mod output;
mod player;
mod sink;
mod thread;
mod types;

pub use output::RodioOutput;
pub use player::{AudioBackend, AudioPlayer, SharedPlayer};
pub use types::AudioError;
