#![forbid(unsafe_code)]

//! `vielle-queue`
//!
//! The download-slot coordinator: background fetch jobs streaming remote
//! bytes into scratch buffers, a small fixed pool of reusable slots, and
//! the liveness check that keeps a buffer from being reclaimed while a
//! player is reading it.

mod error;
mod fetch;
mod live;
mod queue;
mod slot;

pub use error::QueueError;
pub use fetch::{FetchJob, FetchStatus};
pub use live::LiveSource;
pub use queue::{DownloadQueue, QueueOptions};
pub use slot::DownloadSlot;
