use crate::media::MediaError;

/// Why a controller operation left the state untouched.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("the player has not been initialized")]
    NotInitialized,

    #[error("no track is selected")]
    NoTrackSelected,

    #[error("no track at position {0}")]
    UnknownTrack(usize),

    #[error("cannot seek to {0}")]
    InvalidPosition(f64),

    #[error(transparent)]
    Media(#[from] MediaError),
}
