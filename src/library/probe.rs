//! Duration probing on top of `lofty`.
//!
//! Only the container formats in [`SUPPORTED_EXTENSIONS`] are probed. Every
//! failure (unknown extension, unreadable file, broken header) collapses to
//! `None`; nothing here returns an error or touches the output device.

use std::path::Path;

use lofty::prelude::*;

pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["mp3", "flac", "wav"];

/// Determines a track's playable length without decoding it for output.
pub trait DurationProbe: Send + Sync {
    /// Length of `path` in whole seconds (truncated), or `None` when the file
    /// is unsupported or unreadable.
    fn probe(&self, path: &Path) -> Option<u64>;
}

/// The production prober: reads stream properties with `lofty`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyProbe;

impl DurationProbe for LoftyProbe {
    fn probe(&self, path: &Path) -> Option<u64> {
        read_track(path).map(|info| info.duration_secs)
    }
}

/// Whether `path` has one of the supported extensions (case-insensitive).
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Duration and the tags the scanner uses for labels.
#[derive(Debug, Default, Clone)]
pub(super) struct TrackInfo {
    pub duration_secs: u64,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

pub(super) fn read_track(path: &Path) -> Option<TrackInfo> {
    if !is_supported(path) {
        return None;
    }

    let tagged = lofty::read_from_path(path).ok()?;
    let mut info = TrackInfo {
        duration_secs: tagged.properties().duration().as_secs(),
        ..TrackInfo::default()
    };

    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        info.title = non_blank(tag.title().as_deref());
        info.artist = non_blank(tag.artist().as_deref());
        info.album = non_blank(tag.album().as_deref());
    }

    Some(info)
}

fn non_blank(v: Option<&str>) -> Option<String> {
    v.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
