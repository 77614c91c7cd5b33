use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, info, warn};

use super::error::MediaError;
use super::events::Observers;
use super::sink::{create_sink_at, probe_duration};
use super::types::{MediaCmd, MediaEvent, MediaInfoHandle, SourceId};

/// Everything the audio thread owns about the current source.
pub(super) struct Deck {
    stream: Option<OutputStream>,
    sink: Option<Sink>,
    source: SourceId,
    location: Option<PathBuf>,
    pub(super) duration: Option<Duration>,
    pub(super) paused: bool,
    pub(super) ended: bool,
    // Position = accumulated + time since started_at (while playing).
    pub(super) started_at: Option<Instant>,
    pub(super) accumulated: Duration,
    info: MediaInfoHandle,
    observers: Observers,
}

impl Deck {
    /// An idle deck. Without an output stream it still keeps the books but
    /// never builds a sink.
    pub(super) fn new(
        stream: Option<OutputStream>,
        info: MediaInfoHandle,
        observers: Observers,
    ) -> Self {
        Self {
            stream,
            sink: None,
            source: SourceId::default(),
            location: None,
            duration: None,
            paused: true,
            ended: false,
            started_at: None,
            accumulated: Duration::ZERO,
            info,
            observers,
        }
    }

    pub(super) fn elapsed(&self) -> Duration {
        let raw = self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed());
        match self.duration {
            Some(d) => raw.min(d),
            None => raw,
        }
    }

    fn publish(&self) {
        if let Ok(mut info) = self.info.lock() {
            info.source = self.source;
            info.position = self.elapsed().as_secs_f64();
            info.duration = self.duration.map(|d| d.as_secs_f64());
        }
    }

    fn emit_position(&self) {
        self.observers.emit(MediaEvent::PositionChanged {
            source: self.source,
            seconds: self.elapsed().as_secs_f64(),
        });
    }

    fn stop_sink(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
    }

    /// Build a fresh paused sink for the current location at `start_at`.
    fn rebuild_sink(&mut self, start_at: Duration) {
        self.stop_sink();
        let (Some(stream), Some(location)) = (self.stream.as_ref(), self.location.as_deref())
        else {
            return;
        };
        match create_sink_at(stream, location, start_at) {
            Ok(s) => self.sink = Some(s),
            Err(e) => warn!(error = %e, "media: could not prepare source"),
        }
    }

    pub(super) fn load(&mut self, source: SourceId, location: PathBuf) {
        info!(source = source.0, location = %location.display(), "media: loading source");
        self.source = source;
        self.paused = true;
        self.ended = false;
        self.started_at = None;
        self.accumulated = Duration::ZERO;
        self.duration = probe_duration(&location);
        self.location = Some(location);
        self.rebuild_sink(Duration::ZERO);
        self.publish();

        if let Some(d) = self.duration {
            self.observers.emit(MediaEvent::DurationKnown {
                source,
                seconds: d.as_secs_f64(),
            });
        } else {
            debug!(source = source.0, "media: duration unknown");
        }
        self.emit_position();
    }

    pub(super) fn play(&mut self) {
        if self.ended {
            // Playing a finished source starts it over.
            self.ended = false;
            self.accumulated = Duration::ZERO;
            self.rebuild_sink(Duration::ZERO);
        }
        let Some(s) = self.sink.as_ref() else {
            debug!("media: play ignored, no playable source");
            return;
        };
        if self.paused {
            s.play();
            self.started_at = Some(Instant::now());
            self.paused = false;
            self.publish();
        }
    }

    pub(super) fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.accumulated = self.elapsed();
        self.started_at = None;
        if let Some(s) = self.sink.as_ref() {
            s.pause();
        }
        self.paused = true;
        self.publish();
        self.emit_position();
    }

    pub(super) fn seek(&mut self, seconds: f64) {
        if self.location.is_none() {
            return;
        }
        let mut target = Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::MAX);
        if let Some(d) = self.duration {
            target = target.min(d);
        }

        // Scrubbing rebuilds the sink and skips into the file.
        self.rebuild_sink(target);
        self.accumulated = target;
        self.ended = false;
        match self.sink.as_ref() {
            Some(s) if !self.paused => {
                s.play();
                self.started_at = Some(Instant::now());
            }
            Some(_) => self.started_at = None,
            None => {
                // Nothing left to play from; hold the position.
                self.started_at = None;
                self.paused = true;
            }
        }
        self.publish();
        self.emit_position();
    }

    /// Periodic work: report progress and notice the end of the source.
    pub(super) fn tick(&mut self) {
        let Some(s) = self.sink.as_ref() else {
            return;
        };
        if self.paused {
            return;
        }
        if s.empty() {
            self.accumulated = self.duration.unwrap_or_else(|| self.elapsed());
            self.started_at = None;
            self.paused = true;
            self.ended = true;
            debug!(source = self.source.0, "media: source ended");
        }
        self.publish();
        self.emit_position();
    }

    fn quit(&mut self, fade_out_ms: u64) {
        if let Some(s) = self.sink.as_ref() {
            if !self.paused {
                fade_out_sink(s, fade_out_ms);
            }
            s.stop();
        }
        self.paused = true;
        self.publish();
    }
}

fn fade_out_sink(sink: &Sink, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    sink.set_volume(1.0);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(1.0 - t);
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}

fn open_stream() -> Result<OutputStream, MediaError> {
    let mut stream = OutputStreamBuilder::open_default_stream()
        .map_err(|e| MediaError::OutputDevice(e.to_string()))?;
    // rodio logs to stderr when the stream is dropped; that would scribble
    // over the TUI.
    stream.log_on_drop(false);
    Ok(stream)
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<MediaCmd>,
    info: MediaInfoHandle,
    observers: Observers,
    tick: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = open_stream()
            .inspect_err(|e| error!(error = %e, "media: playback disabled"))
            .ok();
        let mut deck = Deck::new(stream, info, observers);

        loop {
            match rx.recv_timeout(tick) {
                Ok(cmd) => match cmd {
                    MediaCmd::SetSource { source, location } => deck.load(source, location),
                    MediaCmd::Play => deck.play(),
                    MediaCmd::Pause => deck.pause(),
                    MediaCmd::SetPosition(seconds) => deck.seek(seconds),
                    MediaCmd::Quit { fade_out_ms } => {
                        deck.quit(fade_out_ms);
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => deck.tick(),
                Err(RecvTimeoutError::Disconnected) => {
                    deck.quit(0);
                    break;
                }
            }
        }
        debug!("media: audio thread exiting");
    })
}
