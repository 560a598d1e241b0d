//! Operational counters for publish/subscribe message servers.
//!
//! Connection, publish, and subscription events are grouped into fixed-width
//! time buckets. Each bucket keeps sparse global and per-channel counters
//! and exports them as a serializable snapshot. Old buckets are dropped by a
//! retention policy that keeps the most recent ones.
//!
//! The [`stats`] module is the core; [`events`], [`report`], and the
//! `chanstats` binary replay recorded event logs and render reports.
pub mod args;
pub mod config;
mod entry;
pub mod error;
pub mod events;
mod logger;
pub mod report;
pub mod stats;

pub use entry::run;
pub use logger::init_logging;
