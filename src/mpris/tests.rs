use super::*;
use std::path::Path;
use std::sync::mpsc;

fn handle() -> (MprisHandle, Arc<Mutex<SharedState>>, Receiver<Notice>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify, notices) = mpsc::channel::<Notice>();
    (
        MprisHandle {
            state: state.clone(),
            notify,
        },
        state,
        notices,
    )
}

fn iface() -> (PlayerIface, Arc<Mutex<SharedState>>, Receiver<ControlCmd>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    (
        PlayerIface {
            tx,
            state: state.clone(),
        },
        state,
        rx,
    )
}

#[test]
fn set_track_metadata_sets_and_clears_shared_state() {
    let (handle, state, notices) = handle();
    let catalog = Catalog::builtin(Path::new("/srv"));

    handle.set_track_metadata(Some(1), Some(&catalog), catalog.get(1));
    handle.set_length(1.234567);
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Song 2"));
        assert_eq!(s.url.as_deref(), Some("file:///srv/music/song2.mp3"));
        assert_eq!(s.art_url.as_deref(), Some("file:///srv/images/song2.jpg"));
        assert_eq!(s.length_micros, Some(1_234_567));
        assert_eq!(
            s.track_id.as_ref().map(|p| p.as_str()),
            Some("/org/mpris/MediaPlayer2/track/1")
        );
    }

    handle.set_track_metadata(None, Some(&catalog), None);
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title, None);
        assert_eq!(s.url, None);
        assert_eq!(s.art_url, None);
        assert_eq!(s.length_micros, None);
        assert!(s.track_id.is_none());
    }

    assert_eq!(notices.try_iter().count(), 3);
}

#[test]
fn unknown_length_is_not_published() {
    let (handle, state, _notices) = handle();
    handle.set_length(0.0);
    assert_eq!(state.lock().unwrap().length_micros, None);
    handle.set_length(f64::NAN);
    assert_eq!(state.lock().unwrap().length_micros, None);
}

#[test]
fn position_updates_are_silent_but_seeks_are_announced() {
    let (handle, state, notices) = handle();

    handle.set_position(2.5);
    assert_eq!(state.lock().unwrap().position_micros, 2_500_000);
    assert!(notices.try_recv().is_err());

    handle.seeked(10.0);
    assert_eq!(notices.try_recv().ok(), Some(Notice::Seeked(10_000_000)));
}

#[test]
fn playback_status_maps_state_to_mpris_strings() {
    let (iface, state, _rx) = iface();

    for (status, expected) in [
        (PlaybackStatus::Stopped, "Stopped"),
        (PlaybackStatus::Playing, "Playing"),
        (PlaybackStatus::Paused, "Paused"),
    ] {
        state.lock().unwrap().playback = status;
        assert_eq!(iface.playback_status(), expected);
    }
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let (iface, state, _rx) = iface();

    {
        let mut s = state.lock().unwrap();
        s.title = Some("Title".to_string());
        s.url = Some("file:///tmp/test.mp3".to_string());
        s.art_url = Some("file:///tmp/test.jpg".to_string());
        s.length_micros = Some(42);
        s.track_id = track_path(1);
    }

    let map = iface.metadata();
    for k in [
        "mpris:trackid",
        "xesam:title",
        "xesam:url",
        "mpris:artUrl",
        "mpris:length",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}

#[test]
fn metadata_without_track_only_has_placeholder_id() {
    let (iface, _state, _rx) = iface();
    let map = iface.metadata();
    assert_eq!(map.len(), 1);
    assert!(map.contains_key("mpris:trackid"));
}

#[test]
fn set_position_requires_current_track_id() {
    let (iface, state, rx) = iface();
    state.lock().unwrap().track_id = track_path(2);

    iface.set_position(track_path(1).unwrap(), 5_000_000);
    assert!(rx.try_recv().is_err());

    iface.set_position(track_path(2).unwrap(), 5_000_000);
    assert_eq!(rx.try_recv().ok(), Some(ControlCmd::SetPosition(5_000_000)));
}

#[test]
fn set_position_past_the_end_is_dropped() {
    let (iface, state, rx) = iface();
    {
        let mut s = state.lock().unwrap();
        s.track_id = track_path(0);
        s.length_micros = Some(180_000_000);
    }

    iface.set_position(track_path(0).unwrap(), 180_000_001);
    assert!(rx.try_recv().is_err());

    iface.set_position(track_path(0).unwrap(), 180_000_000);
    assert_eq!(rx.try_recv().ok(), Some(ControlCmd::SetPosition(180_000_000)));

    // Unknown length: nothing to compare against.
    state.lock().unwrap().length_micros = None;
    iface.set_position(track_path(0).unwrap(), 900_000_000);
    assert_eq!(rx.try_recv().ok(), Some(ControlCmd::SetPosition(900_000_000)));
}

#[test]
fn transport_methods_forward_commands() {
    let (iface, _state, rx) = iface();
    iface.play_pause();
    iface.next();
    iface.previous();
    iface.seek(-3_000_000);

    let cmds: Vec<ControlCmd> = rx.try_iter().collect();
    assert_eq!(
        cmds,
        vec![
            ControlCmd::PlayPause,
            ControlCmd::Next,
            ControlCmd::Prev,
            ControlCmd::Seek(-3_000_000)
        ]
    );
}
