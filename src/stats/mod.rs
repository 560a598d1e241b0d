//! Time-bucketed operational counters.
//!
//! Events recorded through [`StatsIndex`] land in the [`CounterBuffer`] for
//! the bucket containing the current time. Buckets are created lazily and
//! bounded by an optional retention limit.
mod bucket;
mod buffer;
mod clock;
mod index;
mod shared;
mod snapshot;


pub use bucket::{BucketKey, Resolution};
pub use buffer::{ChannelCounter, ChannelId, CounterBuffer, GlobalCounter};
pub use clock::{Clock, ManualClock, SystemClock};
pub use index::{DEFAULT_AUTO_EVICT, StatsIndex, StatsSettings};
pub use shared::SharedStats;
pub use snapshot::{BufferSnapshot, ChannelSnapshot, GlobalSnapshot};
