#![forbid(unsafe_code)]

//! `vielle-storage`
//!
//! The streaming scratch buffer: a growable, partially-written local byte
//! store that a background fetch appends to while a player concurrently
//! reads the already-written prefix.
//!
//! - [`ScratchBuffer`] — append-only writes, random-access reads below the
//!   watermark, async [`ScratchBuffer::wait_range`] for blocking semantics.
//! - [`ScratchReader`] — a blocking `Read + Seek` adapter for decoder
//!   threads.

mod error;
mod reader;
mod scratch;

pub use error::{StorageError, StorageResult};
pub use reader::ScratchReader;
pub use scratch::{BufferId, BufferStatus, ScratchBuffer, ScratchOptions, WaitOutcome};
