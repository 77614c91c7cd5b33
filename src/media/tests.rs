use super::*;
use std::time::{Duration, Instant};

fn position(source: u64, seconds: f64) -> MediaEvent {
    MediaEvent::PositionChanged {
        source: SourceId(source),
        seconds,
    }
}

#[test]
fn observers_only_receive_their_kind() {
    let observers = Observers::new();
    let ticks = observers.subscribe(MediaEventKind::PositionChanged);
    let durations = observers.subscribe(MediaEventKind::DurationKnown);

    observers.emit(position(1, 2.5));
    observers.emit(MediaEvent::DurationKnown {
        source: SourceId(1),
        seconds: 180.0,
    });

    let got: Vec<MediaEvent> = ticks.pending().collect();
    assert_eq!(got, vec![position(1, 2.5)]);

    let got: Vec<MediaEvent> = durations.pending().collect();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].kind(), MediaEventKind::DurationKnown);
}

#[test]
fn unsubscribe_stops_delivery() {
    let observers = Observers::new();
    let sub = observers.subscribe(MediaEventKind::PositionChanged);
    assert_eq!(observers.len(), 1);

    observers.unsubscribe(sub.id());
    assert!(observers.is_empty());

    observers.emit(position(1, 1.0));
    assert_eq!(sub.pending().count(), 0);
}

#[test]
fn dropped_subscriptions_are_pruned_on_emit() {
    let observers = Observers::new();
    let keep = observers.subscribe(MediaEventKind::PositionChanged);
    let gone = observers.subscribe(MediaEventKind::PositionChanged);
    drop(gone);

    observers.emit(position(3, 0.25));
    assert_eq!(observers.len(), 1);
    assert_eq!(keep.pending().count(), 1);
}

#[test]
fn subscription_ids_are_unique() {
    let observers = Observers::new();
    let a = observers.subscribe(MediaEventKind::PositionChanged);
    let b = observers.subscribe(MediaEventKind::PositionChanged);
    assert_ne!(a.id(), b.id());
}

#[test]
fn source_ids_advance() {
    let first = SourceId::default().next();
    assert_eq!(first, SourceId(1));
    assert!(first.next() > first);
    assert_eq!(position(7, 0.0).source(), SourceId(7));
}

#[test]
fn opening_a_missing_file_reports_the_path() {
    let err = sink::open_decoder(std::path::Path::new("/no/such/track.mp3"))
        .err()
        .unwrap();
    assert!(matches!(err, MediaError::Open { .. }));
    assert!(err.to_string().contains("/no/such/track.mp3"));
}

#[test]
fn undecodable_files_have_no_duration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fake.mp3");
    std::fs::write(&path, b"definitely not audio").unwrap();

    assert!(sink::probe_duration(&path).is_none());
    assert!(matches!(
        sink::open_decoder(&path),
        Err(MediaError::Decode { .. })
    ));
}

/// Deck without an output device, plus a tap on everything it emits.
struct DeckRig {
    deck: thread::Deck,
    info: types::MediaInfoHandle,
    positions: Subscription,
    durations: Subscription,
    dir: tempfile::TempDir,
}

impl DeckRig {
    fn new() -> Self {
        let info = types::MediaInfoHandle::default();
        let observers = Observers::new();
        let positions = observers.subscribe(MediaEventKind::PositionChanged);
        let durations = observers.subscribe(MediaEventKind::DurationKnown);
        Self {
            deck: thread::Deck::new(None, info.clone(), observers),
            info,
            positions,
            durations,
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn file(&self, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn positions(&self) -> Vec<f64> {
        self.positions
            .pending()
            .map(|e| match e {
                MediaEvent::PositionChanged { seconds, .. } => seconds,
                other => panic!("unexpected {other:?}"),
            })
            .collect()
    }

    fn durations(&self) -> Vec<MediaEvent> {
        self.durations.pending().collect()
    }

    fn published_position(&self) -> f64 {
        self.info.lock().unwrap().position
    }
}

/// One second of 8 kHz mono 16-bit silence.
fn silent_wav() -> Vec<u8> {
    let data_len: u32 = 16_000;
    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&8_000u32.to_le_bytes());
    out.extend_from_slice(&16_000u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.resize(44 + data_len as usize, 0);
    out
}

#[test]
fn deck_announces_duration_once_per_source() {
    let mut rig = DeckRig::new();
    let wav = rig.file("one.wav", &silent_wav());

    rig.deck.load(SourceId(1), wav.clone());
    rig.deck.pause();
    rig.deck.seek(0.5);
    rig.deck.tick();
    let first = rig.durations();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].source(), SourceId(1));
    let MediaEvent::DurationKnown { seconds, .. } = first[0] else {
        panic!("unexpected {:?}", first[0]);
    };
    assert!((seconds - 1.0).abs() < 0.05, "duration {seconds}");
    assert_eq!(rig.info.lock().unwrap().duration, Some(seconds));

    rig.deck.load(SourceId(2), wav);
    let second = rig.durations();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].source(), SourceId(2));
}

#[test]
fn deck_without_duration_only_reports_position() {
    let mut rig = DeckRig::new();
    let junk = rig.file("junk.mp3", b"not audio");

    rig.deck.load(SourceId(1), junk);
    assert!(rig.durations().is_empty());
    assert_eq!(rig.positions(), vec![0.0]);
    assert_eq!(rig.info.lock().unwrap().duration, None);
}

#[test]
fn deck_position_never_passes_the_duration() {
    let mut rig = DeckRig::new();
    rig.deck.duration = Some(Duration::from_secs(3));
    rig.deck.accumulated = Duration::from_secs(10);
    assert_eq!(rig.deck.elapsed(), Duration::from_secs(3));

    rig.deck.duration = None;
    assert_eq!(rig.deck.elapsed(), Duration::from_secs(10));
}

#[test]
fn deck_seek_is_clamped_and_reported() {
    let mut rig = DeckRig::new();
    let junk = rig.file("junk.mp3", b"not audio");
    rig.deck.load(SourceId(1), junk);
    rig.deck.duration = Some(Duration::from_secs(4));
    rig.positions();

    rig.deck.seek(9.0);
    rig.deck.seek(-2.0);
    rig.deck.seek(1.5);
    assert_eq!(rig.positions(), vec![4.0, 0.0, 1.5]);
    assert_eq!(rig.published_position(), 1.5);
}

#[test]
fn deck_seek_before_any_source_is_ignored() {
    let mut rig = DeckRig::new();
    rig.deck.seek(2.0);
    assert!(rig.positions().is_empty());
    assert_eq!(rig.deck.accumulated, Duration::ZERO);
}

#[test]
fn deck_pause_reports_where_it_stopped() {
    let mut rig = DeckRig::new();
    rig.deck.paused = false;
    rig.deck.accumulated = Duration::from_millis(2_500);

    rig.deck.pause();
    assert!(rig.deck.paused);
    assert_eq!(rig.deck.started_at, None);
    assert_eq!(rig.positions(), vec![2.5]);
    assert_eq!(rig.published_position(), 2.5);

    // Already paused: nothing new.
    rig.deck.pause();
    assert!(rig.positions().is_empty());
}

#[test]
fn deck_play_after_the_end_starts_over() {
    let mut rig = DeckRig::new();
    let junk = rig.file("junk.mp3", b"not audio");
    rig.deck.load(SourceId(1), junk);
    rig.deck.duration = Some(Duration::from_secs(4));
    rig.deck.accumulated = Duration::from_secs(4);
    rig.deck.ended = true;

    rig.deck.play();
    assert!(!rig.deck.ended);
    assert_eq!(rig.deck.elapsed(), Duration::ZERO);
}

#[test]
fn deck_seek_without_a_sink_holds_the_position() {
    let mut rig = DeckRig::new();
    let junk = rig.file("junk.mp3", b"not audio");
    rig.deck.load(SourceId(1), junk);
    rig.deck.paused = false;
    rig.deck.started_at = Instant::now().checked_sub(Duration::from_secs(30));

    rig.deck.seek(0.75);
    assert!(rig.deck.paused);
    assert_eq!(rig.deck.started_at, None);
    assert_eq!(rig.deck.elapsed(), Duration::from_millis(750));
}
