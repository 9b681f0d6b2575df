#![forbid(unsafe_code)]

//! `vielle-events`
//!
//! The shared event bus and the event taxonomy: pool workload changes,
//! fetch progress, and player lifecycle notifications.

mod bus;
mod event;

pub use bus::EventBus;
pub use event::{Event, FetchEvent, PlayerEvent, QueueEvent};
