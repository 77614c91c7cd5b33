use super::*;
use crate::config::TrackSetting;
use std::path::{Path, PathBuf};

#[test]
fn builtin_catalog_has_three_songs_in_order() {
    let catalog = Catalog::builtin(Path::new("/srv/player"));
    assert_eq!(catalog.len(), 3);

    let titles: Vec<&str> = catalog.tracks().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Song 1", "Song 2", "Song 3"]);
    assert_eq!(catalog.tracks()[1].file_name, "song2.mp3");
    assert_eq!(catalog.tracks()[2].image_url, "/images/song3.jpg");
}

#[test]
fn builtin_catalog_resolves_under_music_and_images() {
    let catalog = Catalog::builtin(Path::new("/srv/player"));
    let first = catalog.get(0).unwrap();

    assert_eq!(
        catalog.media_location(first),
        PathBuf::from("/srv/player/music/song1.mp3")
    );
    assert_eq!(
        catalog.image_location(first),
        Some(PathBuf::from("/srv/player/images/song1.jpg"))
    );
    assert_eq!(catalog.music_dir(), Path::new("/srv/player/music"));
}

#[test]
fn duplicate_entries_are_kept() {
    let song = Track::new("Same", "same.mp3", "");
    let catalog = Catalog::new(Path::new("."), vec![song.clone(), song]);
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.get(0), catalog.get(1));
}

#[test]
fn tracks_from_settings_are_trimmed() {
    let setting = TrackSetting {
        title: "  Intro ".into(),
        file_name: " intro.mp3".into(),
        image_url: "images/intro.png ".into(),
    };
    let track = Track::from(&setting);
    assert_eq!(track, Track::new("Intro", "intro.mp3", "images/intro.png"));

    // A leading slash is optional.
    let catalog = Catalog::new(Path::new("/base"), vec![track]);
    assert_eq!(
        catalog.image_location(&catalog.tracks()[0]),
        Some(PathBuf::from("/base/images/intro.png"))
    );
}

#[test]
fn empty_catalog_reports_empty() {
    let catalog = Catalog::new(Path::new("."), Vec::new());
    assert!(catalog.is_empty());
    assert!(catalog.get(0).is_none());
}
