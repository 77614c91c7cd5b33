/// UI-visible snapshot of what is selected, whether it plays, and where.
///
/// Before the first duration notification `duration_seconds` is 0 and the
/// position is 0. Afterwards `current_time_seconds` stays within
/// `[0, duration_seconds]`, except right after an optimistic seek past the end.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_time_seconds: f64,
    pub duration_seconds: f64,
    /// Catalog position of the selected track.
    pub selected: Option<usize>,
}

impl PlaybackState {
    /// Whether metadata for the current source has resolved.
    pub fn duration_known(&self) -> bool {
        self.duration_seconds > 0.0
    }

    /// Position as a fraction of the duration, for progress bars.
    pub fn progress(&self) -> f64 {
        if !self.duration_known() {
            return 0.0;
        }
        (self.current_time_seconds / self.duration_seconds).clamp(0.0, 1.0)
    }

    pub fn status(&self) -> PlaybackStatus {
        match (self.selected, self.is_playing) {
            (None, _) => PlaybackStatus::Stopped,
            (Some(_), true) => PlaybackStatus::Playing,
            (Some(_), false) => PlaybackStatus::Paused,
        }
    }
}

/// Coarse status as reported to media-key integrations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Format seconds as `M:SS`: minutes unpadded, seconds zero-padded,
/// fractional seconds truncated.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
