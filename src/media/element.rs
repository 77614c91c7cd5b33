use std::path::Path;

use super::error::MediaError;
use super::events::Subscription;
use super::types::{MediaEventKind, SourceId, SubscriptionId};

/// A media-playback primitive: something that can load one source at a time,
/// play and pause it, jump to a position, and report progress asynchronously.
///
/// Implementations decode and output audio themselves; callers only drive
/// them and listen to `PositionChanged` / `DurationKnown` notifications.
pub trait MediaElement {
    /// Bind a new source, paused at zero. Supersedes any previous source.
    fn set_source(&mut self, location: &Path) -> Result<SourceId, MediaError>;

    fn play(&mut self) -> Result<(), MediaError>;

    fn pause(&mut self) -> Result<(), MediaError>;

    /// Move the playback position. Out-of-range values are clamped by the
    /// element.
    fn set_position(&mut self, seconds: f64) -> Result<(), MediaError>;

    /// Current position in seconds.
    fn position(&self) -> f64;

    /// Duration of the current source, once metadata has resolved.
    fn duration(&self) -> Option<f64>;

    fn subscribe(&mut self, kind: MediaEventKind) -> Subscription;

    fn unsubscribe(&mut self, id: SubscriptionId);
}
