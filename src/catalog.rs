//! The playlist: an ordered list of tracks plus the rules that turn a track's
//! file and image references into locations on disk.

mod model;
mod scan;

pub use model::*;
pub use scan::scan;

#[cfg(test)]
mod tests;
