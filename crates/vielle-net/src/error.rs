use thiserror::Error;

/// Centralized error type for `vielle-net`.
#[derive(Debug, Error, Clone)]
pub enum NetError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("HTTP {status} for URL: {url}")]
    HttpStatus { status: u16, url: String },
    #[error("timeout")]
    Timeout,
}

impl NetError {
    pub fn http_status(status: u16, url: String) -> Self {
        Self::HttpStatus { status, url }
    }

    pub fn http<S: Into<String>>(msg: S) -> Self {
        Self::Http(msg.into())
    }

    /// Gets the HTTP status code if this is an HTTP status error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            NetError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NetError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(error.to_string())
        }
    }
}

pub type NetResult<T> = Result<T, NetError>;
