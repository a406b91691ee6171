//! Forwards new feed entries to a single chat channel.
//!
//! State lives in the channel itself: one pinned message holds a small JSON
//! document with the configured feeds and the time of the last scan.

pub mod cmd;
pub mod config;
pub mod data;
pub mod error;
pub mod scheduler;
pub mod transport;
pub mod util;

pub use error::{Error, Result};
