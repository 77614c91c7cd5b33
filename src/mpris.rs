use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::{debug, warn};
use zbus::object_server::SignalEmitter;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::catalog::{Catalog, Track};
use crate::player::PlaybackStatus;

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.spindle";
const NOTICE_POLL: Duration = Duration::from_millis(100);

/// Requests coming in over D-Bus, handled by the event loop.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Next,
    Prev,
    /// Relative offset in microseconds.
    Seek(i64),
    /// Absolute position in microseconds.
    SetPosition(i64),
}

/// What the service thread should tell clients about.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Notice {
    Properties,
    Seeked(i64),
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackStatus,
    title: Option<String>,
    url: Option<String>,
    art_url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<OwnedObjectPath>,
    position_micros: i64,
}

fn micros(seconds: f64) -> i64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1_000_000.0).round() as i64
    } else {
        0
    }
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn track_path(index: usize) -> Option<OwnedObjectPath> {
    OwnedObjectPath::try_from(format!("{OBJECT_PATH}/track/{index}")).ok()
}

/// Cheap handle the runtime uses to publish state to the service thread.
pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<Notice>,
}

impl MprisHandle {
    fn changed(&self) {
        let _ = self.notify.send(Notice::Properties);
    }

    pub fn set_playback(&self, playback: PlaybackStatus) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = playback;
        }
        self.changed();
    }

    /// Describe the selected track, or clear the metadata with `None`.
    pub fn set_track_metadata(
        &self,
        index: Option<usize>,
        catalog: Option<&Catalog>,
        track: Option<&Track>,
    ) {
        if let Ok(mut s) = self.state.lock() {
            match (index, catalog, track) {
                (Some(index), Some(catalog), Some(track)) => {
                    s.title = Some(track.title.clone());
                    s.url = Some(file_url(&catalog.media_location(track)));
                    s.art_url = catalog.image_location(track).map(|p| file_url(&p));
                    s.track_id = track_path(index);
                }
                _ => {
                    s.title = None;
                    s.url = None;
                    s.art_url = None;
                    s.track_id = None;
                }
            }
            s.length_micros = None;
            s.position_micros = 0;
        }
        self.changed();
    }

    /// Track length once known. Zero means unknown.
    pub fn set_length(&self, seconds: f64) {
        if let Ok(mut s) = self.state.lock() {
            let length = micros(seconds);
            s.length_micros = (length > 0).then_some(length);
        }
        self.changed();
    }

    /// Position is polled by clients and does not raise PropertiesChanged.
    pub fn set_position(&self, seconds: f64) {
        if let Ok(mut s) = self.state.lock() {
            s.position_micros = micros(seconds);
        }
    }

    /// Report a discontinuous jump in position.
    pub fn seeked(&self, seconds: f64) {
        self.set_position(seconds);
        let _ = self.notify.send(Notice::Seeked(micros(seconds)));
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "spindle"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

fn owned<'a>(value: impl Into<Value<'a>>) -> Option<OwnedValue> {
    OwnedValue::try_from(value.into()).ok()
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    // There is no stopped state once a track is selected.
    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn seek(&self, offset: i64) {
        let _ = self.tx.send(ControlCmd::Seek(offset));
    }

    /// Ignored unless `track_id` names the current track and `position`
    /// lies within it.
    fn set_position(&self, track_id: OwnedObjectPath, position: i64) {
        let (current, length) = match self.state.lock() {
            Ok(s) => (s.track_id.clone(), s.length_micros),
            Err(_) => (None, None),
        };
        let past_end = length.is_some_and(|len| position > len);
        if current.as_ref() != Some(&track_id) || position < 0 || past_end {
            debug!(track_id = %track_id.as_str(), position, "mpris: stale SetPosition");
            return;
        }
        let _ = self.tx.send(ControlCmd::SetPosition(position));
    }

    #[zbus(signal)]
    async fn seeked(emitter: &SignalEmitter<'_>, position: i64) -> zbus::Result<()>;

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlaybackStatus::Stopped => "Stopped",
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.state.lock().map(|s| s.position_micros).unwrap_or(0)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let track_id = s
            .track_id
            .clone()
            .map(OwnedObjectPath::into_inner)
            .or_else(|| ObjectPath::try_from("/org/mpris/MediaPlayer2/TrackList/NoTrack").ok());
        let entries = [
            ("mpris:trackid", track_id.and_then(owned)),
            ("xesam:title", s.title.clone().and_then(owned)),
            ("xesam:url", s.url.clone().and_then(owned)),
            ("mpris:artUrl", s.art_url.clone().and_then(owned)),
            ("mpris:length", s.length_micros.and_then(owned)),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                map.insert(key.to_string(), value);
            }
        }
        map
    }
}

async fn announce(connection: &Connection, notice: Notice) -> zbus::Result<()> {
    let iface_ref = connection
        .object_server()
        .interface::<_, PlayerIface>(OBJECT_PATH)
        .await?;
    let emitter = iface_ref.signal_emitter();
    match notice {
        Notice::Properties => {
            let iface = iface_ref.get().await;
            iface.playback_status_changed(emitter).await?;
            iface.metadata_changed(emitter).await?;
        }
        Notice::Seeked(position) => PlayerIface::seeked(emitter, position).await?,
    }
    Ok(())
}

async fn serve(tx: Sender<ControlCmd>, state: Arc<Mutex<SharedState>>, notices: Receiver<Notice>) {
    let connection = match Connection::session().await {
        Ok(c) => c,
        Err(e) => {
            warn!("mpris: failed to connect to session bus: {e}");
            return;
        }
    };

    if let Err(e) = connection.request_name(BUS_NAME).await {
        warn!("mpris: failed to acquire name: {e}");
        return;
    }

    let object_server = connection.object_server();

    if let Err(e) = object_server.at(OBJECT_PATH, RootIface { tx: tx.clone() }).await {
        warn!("mpris: failed to register root iface: {e}");
        return;
    }

    if let Err(e) = object_server.at(OBJECT_PATH, PlayerIface { tx, state }).await {
        warn!("mpris: failed to register player iface: {e}");
        return;
    }
    debug!(name = BUS_NAME, "mpris: registered");

    loop {
        Timer::after(NOTICE_POLL).await;

        // Coalesce property notices; seeks are forwarded one by one.
        let mut properties = false;
        let mut seeks: Vec<i64> = Vec::new();
        loop {
            match notices.try_recv() {
                Ok(Notice::Properties) => properties = true,
                Ok(Notice::Seeked(position)) => seeks.push(position),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return,
            }
        }

        let pending = properties.then_some(Notice::Properties).into_iter();
        for notice in pending.chain(seeks.into_iter().map(Notice::Seeked)) {
            if let Err(e) = announce(&connection, notice).await {
                debug!("mpris: failed to emit {notice:?}: {e}");
            }
        }
    }
}

/// Start the MPRIS service on its own thread. The handle works even when the
/// session bus is unavailable; updates are then simply dropped.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify, notices) = mpsc::channel::<Notice>();

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(serve(tx, state_for_thread, notices));
    });

    MprisHandle { state, notify }
}

#[cfg(test)]
mod tests;
