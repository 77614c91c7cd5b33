use crate::media::MediaElement;
use crate::mpris::MprisHandle;
use crate::player::{PlaybackController, PlaybackStatus};

/// Last values pushed to MPRIS, so only changes raise PropertiesChanged.
#[derive(Debug, Default)]
pub struct MprisSync {
    published: bool,
    selected: Option<usize>,
    status: PlaybackStatus,
    duration_seconds: f64,
}

impl MprisSync {
    /// Mirror the controller into the MPRIS shared state.
    pub fn update<M: MediaElement>(&mut self, mpris: &MprisHandle, controller: &PlaybackController<M>) {
        let state = controller.state();
        let first = !self.published;
        self.published = true;

        if first || state.selected != self.selected {
            mpris.set_track_metadata(state.selected, controller.catalog(), controller.selected_track());
            self.selected = state.selected;
            self.duration_seconds = 0.0;
        }

        let status = state.status();
        if first || status != self.status {
            mpris.set_playback(status);
            self.status = status;
        }

        if state.duration_seconds != self.duration_seconds {
            mpris.set_length(state.duration_seconds);
            self.duration_seconds = state.duration_seconds;
        }

        mpris.set_position(state.current_time_seconds);
    }
}
