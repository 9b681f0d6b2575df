//! Configuration for [`Session`](crate::Session).

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use url::Url;
use vielle_api::Credentials;
use vielle_net::NetOptions;

/// Unified configuration for a playback session.
///
/// # Example
///
/// ```ignore
/// let config = SessionConfig::new(server_url)
///     .with_credentials(Credentials { username, password })
///     .with_slot_count(3)
///     .with_local_library("/home/me/Music");
/// ```
pub struct SessionConfig {
    /// Base URL of the music server.
    pub server_url: Url,
    /// Optional basic-auth credentials for the server.
    pub credentials: Option<Credentials>,
    /// Directory for per-slot scratch files.
    pub scratch_dir: PathBuf,
    /// Number of download slots (playing track + prefetches).
    pub slot_count: usize,
    /// Network configuration (timeouts, pooling).
    pub net: NetOptions,
    /// Event bus channel capacity.
    pub event_capacity: usize,
    /// Root of an on-disk library mirror; items found there play locally.
    pub local_library: Option<PathBuf>,
    /// Cancellation token for graceful shutdown.
    pub cancel: Option<CancellationToken>,
}

impl SessionConfig {
    pub fn new(server_url: Url) -> Self {
        Self {
            server_url,
            credentials: None,
            scratch_dir: std::env::temp_dir().join("vielle"),
            slot_count: 2,
            net: NetOptions::default(),
            event_capacity: 32,
            local_library: None,
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    #[must_use]
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_slot_count(mut self, count: usize) -> Self {
        self.slot_count = count;
        self
    }

    #[must_use]
    pub fn with_net(mut self, net: NetOptions) -> Self {
        self.net = net;
        self
    }

    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_local_library(mut self, root: impl Into<PathBuf>) -> Self {
        self.local_library = Some(root.into());
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_url() -> Url {
        Url::parse("http://music.local:5050/").unwrap()
    }

    #[test]
    fn defaults_are_sensible() {
        let config = SessionConfig::new(server_url());
        assert_eq!(config.slot_count, 2);
        assert!(config.credentials.is_none());
        assert!(config.local_library.is_none());
        assert!(config.cancel.is_none());
    }

    #[test]
    fn builder_chain() {
        let cancel = CancellationToken::new();
        let config = SessionConfig::new(server_url())
            .with_slot_count(4)
            .with_scratch_dir("/tmp/elsewhere")
            .with_local_library("/music")
            .with_cancel(cancel);
        assert_eq!(config.slot_count, 4);
        assert_eq!(config.scratch_dir, PathBuf::from("/tmp/elsewhere"));
        assert!(config.local_library.is_some());
        assert!(config.cancel.is_some());
    }
}
