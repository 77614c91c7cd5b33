use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::catalog::{self, Catalog, Track};
use crate::config::CatalogSettings;

/// Directory the catalog is resolved against: the first CLI argument, else the
/// current directory.
pub fn base_dir(arg: Option<String>) -> PathBuf {
    arg.map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Pick the catalog source: a scanned directory, then configured tracks, then
/// the built-in playlist.
pub fn build_catalog(base: &Path, settings: &CatalogSettings) -> Catalog {
    if let Some(dir) = &settings.scan_dir {
        let dir = if dir.is_absolute() {
            dir.clone()
        } else {
            base.join(dir)
        };
        if dir.is_dir() {
            let scanned = catalog::scan(&dir, &settings.extensions);
            info!(dir = %dir.display(), tracks = scanned.len(), "catalog: scanned");
            return scanned;
        }
        warn!(dir = %dir.display(), "catalog: scan_dir is not a directory, ignoring");
    }

    if !settings.tracks.is_empty() {
        let tracks: Vec<Track> = settings.tracks.iter().map(Track::from).collect();
        info!(tracks = tracks.len(), "catalog: using configured tracks");
        return Catalog::new(base, tracks);
    }

    Catalog::builtin(base)
}
