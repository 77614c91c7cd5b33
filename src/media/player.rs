use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::debug;

use crate::config::MediaSettings;

use super::element::MediaElement;
use super::error::MediaError;
use super::events::{Observers, Subscription};
use super::thread::spawn_audio_thread;
use super::types::{MediaCmd, MediaEventKind, MediaInfo, MediaInfoHandle, SourceId, SubscriptionId};

/// `rodio`-backed media element. Decoding and output happen on a dedicated
/// audio thread; this handle only sends commands and reads shared state.
pub struct AudioElement {
    tx: Sender<MediaCmd>,
    info: MediaInfoHandle,
    observers: Observers,
    source: SourceId,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioElement {
    pub fn new(settings: &MediaSettings) -> Self {
        let (tx, rx) = mpsc::channel::<MediaCmd>();
        let info: MediaInfoHandle = Arc::new(Mutex::new(MediaInfo::default()));
        let observers = Observers::new();

        let handle = spawn_audio_thread(
            rx,
            info.clone(),
            observers.clone(),
            Duration::from_millis(settings.tick_ms.max(1)),
        );

        Self {
            tx,
            info,
            observers,
            source: SourceId::default(),
            join: Mutex::new(Some(handle)),
        }
    }

    fn send(&self, cmd: MediaCmd) -> Result<(), MediaError> {
        self.tx.send(cmd).map_err(|_| MediaError::Disconnected)
    }

    /// Stop the audio thread, fading out if something is playing, and wait
    /// for it to finish.
    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(MediaCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }

    /// Snapshot of the state last published by the audio thread.
    pub fn info(&self) -> MediaInfo {
        self.info.lock().map(|i| i.clone()).unwrap_or_default()
    }
}

impl MediaElement for AudioElement {
    fn set_source(&mut self, location: &Path) -> Result<SourceId, MediaError> {
        let source = self.source.next();
        self.send(MediaCmd::SetSource {
            source,
            location: location.to_path_buf(),
        })?;
        self.source = source;
        Ok(source)
    }

    fn play(&mut self) -> Result<(), MediaError> {
        self.send(MediaCmd::Play)
    }

    fn pause(&mut self) -> Result<(), MediaError> {
        self.send(MediaCmd::Pause)
    }

    fn set_position(&mut self, seconds: f64) -> Result<(), MediaError> {
        self.send(MediaCmd::SetPosition(seconds))
    }

    fn position(&self) -> f64 {
        self.info().position
    }

    fn duration(&self) -> Option<f64> {
        let info = self.info();
        // Until the thread has loaded our latest source, its duration is stale.
        if info.source == self.source {
            info.duration
        } else {
            None
        }
    }

    fn subscribe(&mut self, kind: MediaEventKind) -> Subscription {
        self.observers.subscribe(kind)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.observers.unsubscribe(id);
    }
}

impl Drop for AudioElement {
    fn drop(&mut self) {
        if !self.observers.is_empty() {
            debug!(observers = self.observers.len(), "media: dropped with live subscriptions");
        }
        self.quit_softly(Duration::ZERO);
    }
}
