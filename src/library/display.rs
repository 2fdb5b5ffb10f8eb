use std::path::Path;

use crate::config::TrackDisplayField;

use super::probe::TrackInfo;

/// Build a track label according to the configured `fields` and separator.
///
/// Fields without a value (a missing tag, a blank title) are skipped; when
/// nothing is left the file stem is used.
pub(super) fn label_from_fields(
    path: &Path,
    info: &TrackInfo,
    fields: &[TrackDisplayField],
    sep: &str,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    for f in fields {
        match f {
            TrackDisplayField::Title => parts.extend(info.title.clone()),
            TrackDisplayField::Artist => parts.extend(info.artist.clone()),
            TrackDisplayField::Album => parts.extend(info.album.clone()),
            TrackDisplayField::Filename => {
                if let Some(name) = file_stem(path) {
                    parts.push(name);
                }
            }
            TrackDisplayField::Path => parts.push(path.display().to_string()),
        }
    }

    if parts.is_empty() {
        file_stem(path).unwrap_or_else(|| path.display().to_string())
    } else {
        parts.join(sep)
    }
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}
