//! Small types shared by the media element, its audio thread and subscribers.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Generation number of a source binding.
///
/// Every `set_source` call hands out a fresh id; notifications carry the id of
/// the source they describe so listeners can drop stale ones.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SourceId(pub u64);

impl SourceId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Identifies one registered observer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// The notification kinds a media element can deliver.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MediaEventKind {
    PositionChanged,
    DurationKnown,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MediaEvent {
    /// The playback position moved (periodic tick, seek, or end of track).
    PositionChanged { source: SourceId, seconds: f64 },
    /// Metadata resolved; fired at most once per source.
    DurationKnown { source: SourceId, seconds: f64 },
}

impl MediaEvent {
    pub fn kind(&self) -> MediaEventKind {
        match self {
            MediaEvent::PositionChanged { .. } => MediaEventKind::PositionChanged,
            MediaEvent::DurationKnown { .. } => MediaEventKind::DurationKnown,
        }
    }

    pub fn source(&self) -> SourceId {
        match *self {
            MediaEvent::PositionChanged { source, .. } | MediaEvent::DurationKnown { source, .. } => {
                source
            }
        }
    }
}

#[derive(Debug)]
pub(crate) enum MediaCmd {
    /// Load a new source, paused at position zero.
    SetSource { source: SourceId, location: PathBuf },
    Play,
    Pause,
    /// Jump to an absolute position in seconds.
    SetPosition(f64),
    /// Quit the audio thread, fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Last-known element state, written by the audio thread.
#[derive(Debug, Clone, Default)]
pub struct MediaInfo {
    pub source: SourceId,
    pub position: f64,
    pub duration: Option<f64>,
}

pub type MediaInfoHandle = Arc<Mutex<MediaInfo>>;
