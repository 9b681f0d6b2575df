#![forbid(unsafe_code)]

//! `vielle-play`
//!
//! The playback state machine and its controller.
//!
//! [`Player`] drives an [`AudioBackend`] handle through a strict
//! prepare/start/pause/seek lifecycle while reconciling asynchronous
//! readiness and error signals with user intent.
//! [`PlaybackController`] glues the machine to the download-slot pool.

mod backend;
mod controller;
#[cfg(test)]
mod controller_tests;
mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
mod player;
mod state;

pub use backend::{AudioBackend, MediaSource, PlayerSignal};
pub use controller::PlaybackController;
pub use error::PlayError;
pub use player::Player;
pub use state::PlaybackState;
