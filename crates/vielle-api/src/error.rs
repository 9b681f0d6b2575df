use thiserror::Error;
use vielle_net::NetError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Net(#[from] NetError),

    #[error("malformed server response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot build endpoint URL for path: {0}")]
    InvalidUrl(String),
}
