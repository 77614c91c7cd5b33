use std::path::Path;

use lofty::prelude::*;
use tracing::debug;
use walkdir::WalkDir;

use super::model::{Catalog, Track};

const COVER_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

fn is_audio_file(path: &Path, extensions: &[String]) -> bool {
    let exts: Vec<String> = extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

/// Path of `path` relative to `root`, with `/` separators.
fn relative_name(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

/// Look for `<stem>.jpg|jpeg|png` next to the audio file.
fn sibling_cover(root: &Path, path: &Path) -> String {
    COVER_EXTENSIONS
        .iter()
        .map(|ext| path.with_extension(ext))
        .find(|candidate| candidate.is_file())
        .and_then(|cover| relative_name(root, &cover))
        .map(|rel| format!("/{rel}"))
        .unwrap_or_default()
}

fn tag_title(path: &Path) -> Option<String> {
    let tagged = lofty::read_from_path(path).ok()?;
    let tag = tagged.primary_tag().or_else(|| tagged.first_tag())?;
    let title = tag.title()?;
    let title = title.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Build a catalog from the audio files below `dir`.
///
/// Titles come from tags when present, otherwise from the file stem. Tracks
/// are ordered by title, case-insensitively.
pub fn scan(dir: &Path, extensions: &[String]) -> Catalog {
    let mut tracks: Vec<Track> = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file() || !is_audio_file(path, extensions) {
            continue;
        }
        let Some(file_name) = relative_name(dir, path) else {
            debug!(path = %path.display(), "catalog: skipping non UTF-8 path");
            continue;
        };

        let title = tag_title(path).unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("UNKNOWN")
                .to_string()
        });

        tracks.push(Track {
            title,
            image_url: sibling_cover(dir, path),
            file_name,
        });
    }

    tracks.sort_by(|a, b| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.file_name.cmp(&b.file_name))
    });
    Catalog::rooted_at(dir, tracks)
}
