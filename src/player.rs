//! Player module: the playback controller and the state it reflects.
//!
//! `PlaybackController` owns a media element and keeps `PlaybackState` in sync
//! with user intent and with the element's position and duration
//! notifications.

mod controller;
mod error;
mod state;

pub use controller::*;
pub use error::PlayerError;
pub use state::*;
