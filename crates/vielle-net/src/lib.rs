#![forbid(unsafe_code)]

//! `vielle-net`
//!
//! Thin HTTP layer used by the fetch jobs and the server API client:
//! streaming and ranged GETs, HEAD probes, and whole-body fetches.

mod client;
mod error;
mod traits;
mod types;

pub use crate::{
    client::HttpClient,
    error::{NetError, NetResult},
    traits::{ByteStream, Net},
    types::{Headers, NetOptions, RangeSpec},
};
