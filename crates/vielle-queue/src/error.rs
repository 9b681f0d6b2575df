use thiserror::Error;
use vielle_storage::StorageError;

#[derive(Debug, Error)]
pub enum QueueError {
    /// Every slot is busy or live; the caller may retry after the next
    /// workload-changed notification.
    #[error("no available download slot")]
    NoAvailableSlot,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
