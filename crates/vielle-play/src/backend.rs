use std::{
    io::{Read, Seek},
    time::Duration,
};

use tokio::sync::broadcast;

use crate::PlayError;

/// Byte-level data source consumed by a backend's decoder thread.
///
/// A partially-downloaded scratch buffer satisfies this: reads below the
/// watermark return immediately, reads past it suspend until the bytes
/// arrive or the transfer reaches a terminal outcome.
pub trait MediaSource: Read + Seek + Send {
    /// Total length in bytes, when known.
    fn byte_len(&self) -> Option<u64>;
}

impl MediaSource for vielle_storage::ScratchReader {
    fn byte_len(&self) -> Option<u64> {
        self.total_len()
    }
}

/// Readiness and lifecycle signals emitted from the backend's own
/// execution context, delivered exactly once per transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerSignal {
    /// Header validation/decoding finished; the source is playable.
    Prepared,
    /// Playback reached the natural end of the source.
    Completed,
    /// The backend failed; only `reset` recovers the session.
    Error { code: i32 },
}

/// Handle to the underlying audio player.
///
/// Owned exclusively by one [`Player`](crate::Player) per session; no
/// other component calls transport operations on it directly. Transport
/// calls return quickly — decode and output run on the backend's own
/// threads, which report back through [`signals`](Self::signals).
pub trait AudioBackend: Send {
    fn set_data_source(&mut self, source: Box<dyn MediaSource>) -> Result<(), PlayError>;

    /// Begin asynchronous readiness checking; a `Prepared` signal follows.
    fn prepare_async(&mut self) -> Result<(), PlayError>;

    fn start(&mut self) -> Result<(), PlayError>;

    fn pause(&mut self) -> Result<(), PlayError>;

    fn stop(&mut self) -> Result<(), PlayError>;

    fn seek_to(&mut self, position: Duration) -> Result<(), PlayError>;

    fn position(&self) -> Duration;

    fn duration(&self) -> Option<Duration>;

    /// Release decoder state and drop the bound source.
    fn reset(&mut self);

    /// Subscribe to the backend's signal channel.
    fn signals(&self) -> broadcast::Receiver<PlayerSignal>;
}
