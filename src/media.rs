//! The media-playback primitive.
//!
//! `MediaElement` is the contract the player drives: load a source, play,
//! pause, seek, and listen for position and duration notifications.
//! `AudioElement` implements it on top of `rodio` with a dedicated audio
//! thread.

mod element;
mod error;
mod events;
mod player;
mod sink;
mod thread;
mod types;

pub use element::MediaElement;
pub use error::MediaError;
pub use events::{Observers, Subscription};
pub use player::AudioElement;
pub use types::{MediaEvent, MediaEventKind, SourceId, SubscriptionId};

#[cfg(test)]
mod tests;
