use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ConfigError;

use super::bucket::{BucketKey, Resolution};
use super::buffer::CounterBuffer;
use super::clock::{Clock, SystemClock};

/// Eviction runs after every recording call unless disabled.
pub const DEFAULT_AUTO_EVICT: bool = true;

/// Validated construction input for a [`StatsIndex`].
///
/// Defaults: unlimited retention (`keep_buckets = None`) and auto-eviction
/// enabled, which is a no-op until a retention limit is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSettings {
    pub resolution: Resolution,
    pub keep_buckets: Option<NonZeroUsize>,
    pub auto_evict: bool,
}

impl StatsSettings {
    #[must_use]
    pub const fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            keep_buckets: None,
            auto_evict: DEFAULT_AUTO_EVICT,
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::ResolutionTooSmall`] when `secs` is not a
    /// finite number of seconds `>= 1`.
    pub fn from_secs_f64(secs: f64) -> Result<Self, ConfigError> {
        Ok(Self::new(Resolution::from_secs_f64(secs)?))
    }

    #[must_use]
    pub const fn with_keep_buckets(mut self, keep_buckets: Option<NonZeroUsize>) -> Self {
        self.keep_buckets = keep_buckets;
        self
    }

    #[must_use]
    pub const fn with_auto_evict(mut self, auto_evict: bool) -> Self {
        self.auto_evict = auto_evict;
        self
    }
}

/// Time-windowed collection of [`CounterBuffer`]s keyed by bucket.
///
/// Buffers are created the first time an event lands in their bucket and
/// are removed only by [`StatsIndex::reset`] or [`StatsIndex::evict_old`].
/// Counters can only change through the recording methods below.
#[derive(Debug)]
pub struct StatsIndex {
    settings: StatsSettings,
    clock: Arc<dyn Clock>,
    buckets: BTreeMap<BucketKey, CounterBuffer>,
}

impl StatsIndex {
    /// Creates an index that reads the system wall clock.
    #[must_use]
    pub fn new(settings: StatsSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(settings: StatsSettings, clock: Arc<dyn Clock>) -> Self {
        tracing::debug!(
            "Stats index created: resolution={}s keep_buckets={:?} auto_evict={}",
            settings.resolution,
            settings.keep_buckets,
            settings.auto_evict
        );
        Self {
            settings,
            clock,
            buckets: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.settings.resolution
    }

    #[must_use]
    pub fn bucket_of(&self, timestamp: Duration) -> BucketKey {
        self.settings.resolution.bucket_of(timestamp)
    }

    #[must_use]
    pub fn current_bucket_key(&self) -> BucketKey {
        self.bucket_of(self.clock.now())
    }

    pub fn new_connection(&mut self) {
        self.record(CounterBuffer::new_connection);
    }

    pub fn connection_closed(&mut self) {
        self.record(CounterBuffer::connection_closed);
    }

    pub fn message_published(&mut self, channel: &str) {
        self.record(|buffer| buffer.message_published(channel));
    }

    pub fn channel_subscribed(&mut self, channel: &str) {
        self.record(|buffer| buffer.channel_subscribed(channel));
    }

    pub fn channels_subscribed_multiplexed_ws<S>(&mut self, channels: &[S])
    where
        S: AsRef<str>,
    {
        self.record(|buffer| buffer.channels_subscribed_multiplexed_ws(channels));
    }

    pub fn channels_subscribed_multiplexed_long_polling<S>(&mut self, channels: &[S])
    where
        S: AsRef<str>,
    {
        self.record(|buffer| buffer.channels_subscribed_multiplexed_long_polling(channels));
    }

    pub fn channels_subscribed_multiplexed_ws_dynamic<D>(&mut self, descriptors: &[D]) {
        self.record(|buffer| buffer.channels_subscribed_multiplexed_ws_dynamic(descriptors));
    }

    /// Read-only view of every retained bucket, ordered by key.
    #[must_use]
    pub const fn snapshot(&self) -> &BTreeMap<BucketKey, CounterBuffer> {
        &self.buckets
    }

    #[must_use]
    pub fn bucket(&self, key: BucketKey) -> Option<&CounterBuffer> {
        self.buckets.get(&key)
    }

    /// The retained bucket with the largest key.
    #[must_use]
    pub fn latest(&self) -> Option<&CounterBuffer> {
        self.buckets.last_key_value().map(|(_, buffer)| buffer)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn reset(&mut self) {
        let dropped = self.buckets.len();
        self.buckets.clear();
        tracing::info!("Stats index reset, dropped {} buckets", dropped);
    }

    /// Keeps only the `keep_buckets` largest bucket keys currently present
    /// and returns how many buckets were dropped.
    ///
    /// Only buckets that have received events are considered; the current
    /// time is never consulted.
    pub fn evict_old(&mut self) -> usize {
        let Some(keep) = self.settings.keep_buckets else {
            return 0;
        };
        let excess = self.buckets.len().saturating_sub(keep.get());
        if excess == 0 {
            return 0;
        }
        for _ in 0..excess {
            if let Some((key, _)) = self.buckets.pop_first() {
                tracing::trace!("Evicted bucket {}", key);
            }
        }
        tracing::debug!(
            "Evicted {} buckets, {} retained",
            excess,
            self.buckets.len()
        );
        excess
    }

    fn record<F>(&mut self, apply: F)
    where
        F: FnOnce(&mut CounterBuffer),
    {
        let key = self.current_bucket_key();
        let buffer = self.buckets.entry(key).or_insert_with(|| {
            tracing::debug!("Opened stats bucket {}", key);
            CounterBuffer::new(key)
        });
        apply(buffer);
        if self.settings.auto_evict {
            self.evict_old();
        }
    }
}
