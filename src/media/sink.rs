//! Helpers for turning a file on disk into a paused `rodio` sink.
//!
//! Opening and decoding is split from sink creation so the audio thread can
//! learn the duration once per source and then rebuild sinks cheaply when
//! seeking.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use rodio::{Decoder, OutputStream, Sink, Source};

use super::error::MediaError;

type FileDecoder = Decoder<BufReader<File>>;

pub(super) fn open_decoder(path: &Path) -> Result<FileDecoder, MediaError> {
    let file = File::open(path).map_err(|source| MediaError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    Decoder::new(BufReader::new(file)).map_err(|e| MediaError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Resolve the duration of `path`: the decoder's own answer first, then the
/// container properties lofty reads.
pub(super) fn probe_duration(path: &Path) -> Option<Duration> {
    let from_decoder = open_decoder(path)
        .ok()
        .and_then(|decoder| decoder.total_duration());

    from_decoder.or_else(|| {
        lofty::read_from_path(path)
            .ok()
            .map(|tagged| tagged.properties().duration())
            .filter(|d| !d.is_zero())
    })
}

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<Sink, MediaError> {
    // `skip_duration` is the seeking primitive; Duration::ZERO is fine.
    let source = open_decoder(path)?.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}
