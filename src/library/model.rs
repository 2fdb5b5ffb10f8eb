use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub path: PathBuf,
    pub label: String,
    /// Length probed at scan time, truncated to whole seconds.
    pub duration_secs: u64,
}

pub type SharedLibrary = Arc<Mutex<Library>>;

/// Ordered track list plus the folder it was scanned from.
#[derive(Debug, Default)]
pub struct Library {
    tracks: Vec<Track>,
    folder: Option<PathBuf>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole library with a fresh scan of `folder`.
    pub fn replace(&mut self, folder: &Path, tracks: Vec<Track>) {
        self.folder = Some(folder.to_path_buf());
        self.tracks = tracks;
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Swap the track at `index` with its neighbour in `direction` (-1 up,
    /// +1 down). Returns `false` and changes nothing when either position is
    /// out of bounds.
    pub fn reorder(&mut self, index: usize, direction: isize) -> bool {
        let Some(target) = index.checked_add_signed(direction) else {
            return false;
        };
        if index >= self.tracks.len() || target >= self.tracks.len() || target == index {
            return false;
        }
        self.tracks.swap(index, target);
        true
    }

    /// Remove the track at `index`, if any.
    pub fn delete(&mut self, index: usize) -> Option<Track> {
        if index < self.tracks.len() {
            Some(self.tracks.remove(index))
        } else {
            None
        }
    }
}
