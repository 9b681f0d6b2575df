use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::Item;

/// Where the audio bytes for an item can be obtained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaLocation {
    /// Streamed from the server; a download slot manages the transfer.
    Remote(Url),
    /// Complete copy on local disk; no slot or fetch job is needed.
    Local(PathBuf),
}

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("cannot resolve item path: {0}")]
    InvalidPath(String),
}

/// Resolves an item to the place its audio can be read from.
///
/// Implemented by the server API client (possibly routing through a local
/// library mirror first). Resolution is pure — no network round-trip.
pub trait MediaLocator: Send + Sync {
    fn locate(&self, item: &Item) -> Result<MediaLocation, LocateError>;
}
