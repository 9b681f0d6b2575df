#![forbid(unsafe_code)]

//! `vielle-api`
//!
//! Client for the music server's browse/query API, and the local-first
//! media routing that decides whether an item streams from the server or
//! plays from an on-disk library mirror.

mod client;
mod error;
mod models;
mod router;

pub use client::{Credentials, ServerApi};
pub use error::{ApiError, ApiResult};
pub use models::{BrowseEntry, Directory};
pub use router::{LocalIndex, MediaRouter};
