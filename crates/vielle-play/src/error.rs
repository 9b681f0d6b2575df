use thiserror::Error;
use vielle_core::LocateError;
use vielle_queue::QueueError;
use vielle_storage::StorageError;

#[derive(Debug, Error)]
pub enum PlayError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
