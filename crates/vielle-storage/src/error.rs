use thiserror::Error;

/// Result type used by `vielle-storage`.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors produced by the scratch buffer.
///
/// `Stalled` is transient — the writer reached a terminal outcome without
/// sealing the buffer, and a new writer may resume. `Failed` is permanent.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid range: start {start} >= end {end}")]
    InvalidRange { start: u64, end: u64 },

    #[error("read past end of data: offset {offset}, total {total}")]
    OutOfRange { offset: u64, total: u64 },

    #[error("bytes not yet available at offset {offset}")]
    NotYetAvailable { offset: u64 },

    #[error("buffer sealed")]
    Sealed,

    #[error("buffer failed: {0}")]
    Failed(String),

    #[error("writer stalled: {0}")]
    Stalled(String),

    #[error("buffer closed")]
    Closed,

    #[error("operation cancelled")]
    Cancelled,
}
