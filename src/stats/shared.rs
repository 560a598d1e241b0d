use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::report::IndexReport;

use super::bucket::BucketKey;
use super::buffer::CounterBuffer;
use super::index::StatsIndex;
use super::snapshot::BufferSnapshot;

/// Cloneable handle for hosts that record from several threads.
///
/// Bucket creation, increments, and eviction all run under one lock, so a
/// bucket is created exactly once and eviction never overlaps an increment.
#[derive(Debug, Clone)]
pub struct SharedStats {
    inner: Arc<Mutex<StatsIndex>>,
}

impl SharedStats {
    #[must_use]
    pub fn new(index: StatsIndex) -> Self {
        Self {
            inner: Arc::new(Mutex::new(index)),
        }
    }

    pub fn new_connection(&self) {
        self.lock().new_connection();
    }

    pub fn connection_closed(&self) {
        self.lock().connection_closed();
    }

    pub fn message_published(&self, channel: &str) {
        self.lock().message_published(channel);
    }

    pub fn channel_subscribed(&self, channel: &str) {
        self.lock().channel_subscribed(channel);
    }

    pub fn channels_subscribed_multiplexed_ws<S>(&self, channels: &[S])
    where
        S: AsRef<str>,
    {
        self.lock().channels_subscribed_multiplexed_ws(channels);
    }

    pub fn channels_subscribed_multiplexed_long_polling<S>(&self, channels: &[S])
    where
        S: AsRef<str>,
    {
        self.lock()
            .channels_subscribed_multiplexed_long_polling(channels);
    }

    pub fn channels_subscribed_multiplexed_ws_dynamic<D>(&self, descriptors: &[D]) {
        self.lock()
            .channels_subscribed_multiplexed_ws_dynamic(descriptors);
    }

    pub fn evict_old(&self) -> usize {
        self.lock().evict_old()
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    /// Runs `read` against the retained buckets while holding the lock.
    pub fn with_snapshot<F, R>(&self, read: F) -> R
    where
        F: FnOnce(&BTreeMap<BucketKey, CounterBuffer>) -> R,
    {
        read(self.lock().snapshot())
    }

    /// Exported snapshots of every retained bucket, ordered by key.
    #[must_use]
    pub fn snapshots(&self) -> Vec<BufferSnapshot> {
        self.with_snapshot(|buckets| buckets.values().map(CounterBuffer::to_snapshot).collect())
    }

    /// Whole-index report built while holding the lock.
    #[must_use]
    pub fn report(&self) -> IndexReport {
        let index = self.lock();
        IndexReport::from_buckets(index.resolution(), index.snapshot())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Poisoning is ignored: every counter update is a single write.
    fn lock(&self) -> MutexGuard<'_, StatsIndex> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<StatsIndex> for SharedStats {
    fn from(index: StatsIndex) -> Self {
        Self::new(index)
    }
}
