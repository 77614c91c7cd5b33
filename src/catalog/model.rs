use std::path::{Path, PathBuf};

use crate::config::TrackSetting;

/// One playable entry. Tracks have no identity beyond their position in the
/// catalog; two entries with identical fields are still distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub file_name: String,
    /// Cover reference, rooted at the catalog's asset root (`/images/x.jpg`).
    /// Empty when the track has no cover.
    pub image_url: String,
}

impl Track {
    pub fn new(title: impl Into<String>, file_name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            file_name: file_name.into(),
            image_url: image_url.into(),
        }
    }
}

impl From<&TrackSetting> for Track {
    fn from(t: &TrackSetting) -> Self {
        Track::new(t.title.trim(), t.file_name.trim(), t.image_url.trim())
    }
}

/// Ordered tracks plus where their media and images live.
#[derive(Debug, Clone)]
pub struct Catalog {
    tracks: Vec<Track>,
    music_dir: PathBuf,
    asset_root: PathBuf,
}

impl Catalog {
    /// Media resolves to `<base>/music/<file_name>`, images to
    /// `<base>/<image_url>`.
    pub fn new(base: &Path, tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            music_dir: base.join("music"),
            asset_root: base.to_path_buf(),
        }
    }

    /// A catalog whose file names are relative to `root` itself.
    pub fn rooted_at(root: &Path, tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            music_dir: root.to_path_buf(),
            asset_root: root.to_path_buf(),
        }
    }

    /// The built-in three-song playlist.
    pub fn builtin(base: &Path) -> Self {
        let tracks = (1..=3)
            .map(|n| {
                Track::new(
                    format!("Song {n}"),
                    format!("song{n}.mp3"),
                    format!("/images/song{n}.jpg"),
                )
            })
            .collect();
        Self::new(base, tracks)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn music_dir(&self) -> &Path {
        &self.music_dir
    }

    /// Where the audio for `track` lives.
    pub fn media_location(&self, track: &Track) -> PathBuf {
        self.music_dir.join(&track.file_name)
    }

    /// Where the cover for `track` lives, if it has one.
    pub fn image_location(&self, track: &Track) -> Option<PathBuf> {
        let rel = track.image_url.trim().trim_start_matches('/');
        if rel.is_empty() {
            None
        } else {
            Some(self.asset_root.join(rel))
        }
    }
}
