#![forbid(unsafe_code)]

//! # Vielle
//!
//! Streaming playback core for a remote music collection: play tracks
//! while they are still being fetched, reusing a small pool of download
//! slots so the same track is never transferred twice.
//!
//! ## Quick start
//!
//! ```ignore
//! use vielle::{Session, SessionConfig};
//!
//! let config = SessionConfig::new("http://music.local:5050/".parse()?);
//! let session = Session::new(config, backend).await?;
//!
//! let entries = session.api().browse("").await?;
//! session.controller().play(&item).await?;
//! ```

// ── Re-export sub-crates ────────────────────────────────────────────────

pub mod api {
    pub use vielle_api::*;
}

pub mod events {
    pub use vielle_events::*;
}

pub mod net {
    pub use vielle_net::*;
}

pub mod play {
    pub use vielle_play::*;
}

pub mod queue {
    pub use vielle_queue::*;
}

pub mod storage {
    pub use vielle_storage::*;
}

pub use vielle_core::{Item, LocateError, MediaLocation, MediaLocator};

// ── Session ─────────────────────────────────────────────────────────────

mod config;
mod session;

pub use config::SessionConfig;
pub use session::{Session, SessionError};

// ── Prelude ─────────────────────────────────────────────────────────────

pub mod prelude {
    pub use vielle_api::{BrowseEntry, Credentials, ServerApi};
    pub use vielle_core::{Item, MediaLocation, MediaLocator};
    pub use vielle_events::{Event, EventBus, FetchEvent, PlayerEvent, QueueEvent};
    pub use vielle_play::{AudioBackend, PlaybackController, PlaybackState, PlayerSignal};
    pub use vielle_queue::{DownloadQueue, FetchStatus, QueueError};

    pub use crate::{Session, SessionConfig};
}
