use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::catalog::{Catalog, Track};
use crate::config::UiSettings;
use crate::media::{MediaElement, MediaEvent, MediaEventKind, SourceId, Subscription};

use super::error::PlayerError;
use super::state::PlaybackState;

/// Presentation options that do not affect playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Raise the rotation flag for `rotation` after a track change.
    pub rotate_on_track_change: bool,
    pub rotation: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            rotate_on_track_change: false,
            rotation: Duration::from_millis(500),
        }
    }
}

impl From<&UiSettings> for ControllerOptions {
    fn from(ui: &UiSettings) -> Self {
        Self {
            rotate_on_track_change: ui.rotate_on_track_change,
            rotation: Duration::from_millis(ui.rotation_ms),
        }
    }
}

/// Keeps `PlaybackState` in sync with a media element.
///
/// State changes in two places only: the operations below, called on user
/// intent, and `process_events`, which applies the element's notifications.
/// Notifications that belong to an earlier source are ignored, so a new
/// selection always supersedes whatever the element was still reporting.
pub struct PlaybackController<M: MediaElement> {
    media: M,
    options: ControllerOptions,
    catalog: Option<Catalog>,
    state: PlaybackState,
    source: Option<SourceId>,
    position_sub: Option<Subscription>,
    duration_sub: Option<Subscription>,
    rotating_until: Option<Instant>,
}

impl<M: MediaElement> PlaybackController<M> {
    pub fn new(media: M, options: ControllerOptions) -> Self {
        Self {
            media,
            options,
            catalog: None,
            state: PlaybackState::default(),
            source: None,
            position_sub: None,
            duration_sub: None,
            rotating_until: None,
        }
    }

    /// Take ownership of `catalog`, select its first track and bind it to the
    /// element without starting playback, then start listening for position
    /// and duration notifications.
    ///
    /// An empty catalog leaves nothing selected. Calling this again replaces
    /// the previous catalog and subscriptions.
    pub fn initialize(&mut self, catalog: Catalog) -> Result<(), PlayerError> {
        self.teardown();
        self.state = PlaybackState::default();
        self.source = None;
        self.rotating_until = None;

        // Subscribe before binding so the first notifications are not missed.
        self.position_sub = Some(self.media.subscribe(MediaEventKind::PositionChanged));
        self.duration_sub = Some(self.media.subscribe(MediaEventKind::DurationKnown));

        let first = catalog.get(0).map(|t| catalog.media_location(t));
        self.catalog = Some(catalog);

        let Some(location) = first else {
            debug!("player: empty catalog, nothing selected");
            return Ok(());
        };

        let source = self.media.set_source(&location)?;
        self.source = Some(source);
        self.state.selected = Some(0);
        info!(location = %location.display(), "player: initialized");
        Ok(())
    }

    /// Unregister the element subscriptions. Safe to call more than once.
    pub fn teardown(&mut self) {
        for sub in [self.position_sub.take(), self.duration_sub.take()]
            .into_iter()
            .flatten()
        {
            self.media.unsubscribe(sub.id());
        }
    }

    /// Select the track at `index`.
    ///
    /// Selecting the track that is already playing pauses it. Anything else
    /// rebinds the element to that track and starts playing it.
    pub fn select_track(&mut self, index: usize) -> Result<(), PlayerError> {
        self.select_track_at(index, Instant::now())
    }

    pub(crate) fn select_track_at(&mut self, index: usize, now: Instant) -> Result<(), PlayerError> {
        let catalog = self.catalog.as_ref().ok_or(PlayerError::NotInitialized)?;
        let track = catalog.get(index).ok_or(PlayerError::UnknownTrack(index))?;

        if self.state.selected == Some(index) && self.state.is_playing {
            self.media.pause()?;
            self.state.is_playing = false;
            return Ok(());
        }

        let location = catalog.media_location(track);
        info!(index, title = %track.title, "player: track selected");

        // Nothing is committed until the element has accepted both calls.
        let source = self.media.set_source(&location)?;
        self.media.play()?;

        self.source = Some(source);
        self.state.selected = Some(index);
        self.state.current_time_seconds = 0.0;
        self.state.duration_seconds = 0.0;
        self.state.is_playing = true;
        if self.options.rotate_on_track_change {
            self.rotating_until = Some(now + self.options.rotation);
        }
        Ok(())
    }

    /// Select the track `offset` positions away from the current one,
    /// wrapping around the catalog.
    pub fn select_relative(&mut self, offset: isize) -> Result<(), PlayerError> {
        let len = self.catalog.as_ref().map_or(0, Catalog::len);
        if len == 0 {
            return Err(PlayerError::NoTrackSelected);
        }
        let current = self.state.selected.unwrap_or(0) as isize;
        let next = (current + offset).rem_euclid(len as isize) as usize;
        self.select_track(next)
    }

    /// Pause when playing, play otherwise.
    pub fn toggle_playback(&mut self) -> Result<(), PlayerError> {
        if self.state.selected.is_none() {
            return Err(PlayerError::NoTrackSelected);
        }

        if self.state.is_playing {
            self.media.pause()?;
            self.state.is_playing = false;
        } else {
            self.media.play()?;
            self.state.is_playing = true;
        }
        Ok(())
    }

    /// Move the element to `to_seconds` and reflect it right away, without
    /// waiting for the element to confirm. Negative values mean 0.
    pub fn seek(&mut self, to_seconds: f64) -> Result<(), PlayerError> {
        if self.state.selected.is_none() {
            return Err(PlayerError::NoTrackSelected);
        }
        if !to_seconds.is_finite() {
            return Err(PlayerError::InvalidPosition(to_seconds));
        }

        let target = to_seconds.max(0.0);
        self.media.set_position(target)?;
        self.state.current_time_seconds = target;
        Ok(())
    }

    /// Seek relative to the current position, staying within the known
    /// duration.
    pub fn seek_by(&mut self, delta_seconds: f64) -> Result<(), PlayerError> {
        let mut target = self.state.current_time_seconds + delta_seconds;
        if self.state.duration_known() {
            target = target.min(self.state.duration_seconds);
        }
        self.seek(target.max(0.0))
    }

    /// Position-changed handler. Returns whether the state changed.
    pub fn on_tick(&mut self, source: SourceId, seconds: f64) -> bool {
        if self.source != Some(source) {
            return false;
        }
        let mut position = seconds.max(0.0);
        if self.state.duration_known() {
            position = position.min(self.state.duration_seconds);
        }
        let changed = position != self.state.current_time_seconds;
        self.state.current_time_seconds = position;
        changed
    }

    /// Duration-known handler. Returns whether the state changed.
    pub fn on_duration_resolved(&mut self, source: SourceId, seconds: f64) -> bool {
        if self.source != Some(source) || !seconds.is_finite() || seconds < 0.0 {
            return false;
        }
        let changed = seconds != self.state.duration_seconds;
        self.state.duration_seconds = seconds;
        self.state.current_time_seconds = self.state.current_time_seconds.min(seconds);
        changed
    }

    /// Apply every notification delivered since the last call. Durations are
    /// applied before positions so positions are clamped against the newest
    /// duration. Returns whether the state changed.
    pub fn process_events(&mut self) -> bool {
        let mut events: Vec<MediaEvent> = Vec::new();
        for sub in [self.duration_sub.as_ref(), self.position_sub.as_ref()]
            .into_iter()
            .flatten()
        {
            events.extend(sub.pending());
        }

        let mut changed = false;
        for event in events {
            let source = event.source();
            changed |= match event {
                MediaEvent::DurationKnown { seconds, .. } => self.on_duration_resolved(source, seconds),
                MediaEvent::PositionChanged { seconds, .. } => self.on_tick(source, seconds),
            };
        }

        // A duration the element already knows but never announced to us,
        // e.g. resolved before a re-subscription.
        if !self.state.duration_known() {
            if let (Some(source), Some(seconds)) = (self.source, self.media.duration()) {
                changed |= self.on_duration_resolved(source, seconds);
            }
        }
        changed
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    pub fn selected_track(&self) -> Option<&Track> {
        let catalog = self.catalog.as_ref()?;
        catalog.get(self.state.selected?)
    }

    /// Whether the track-change rotation is still running at `now`.
    pub fn is_rotating(&self, now: Instant) -> bool {
        self.rotating_until.is_some_and(|until| now < until)
    }

    pub fn media(&self) -> &M {
        &self.media
    }
}

impl<M: MediaElement> Drop for PlaybackController<M> {
    fn drop(&mut self) {
        self.teardown();
    }
}
