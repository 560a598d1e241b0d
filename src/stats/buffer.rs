use std::collections::BTreeMap;

use super::bucket::BucketKey;
use super::snapshot::{BufferSnapshot, ChannelSnapshot, GlobalSnapshot};

/// Channel identifiers are taken verbatim from the transport layer.
pub type ChannelId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GlobalCounter {
    ConnectionsOpened,
    ConnectionsClosed,
    Published,
    Subscribed,
    SubscribedMultiplexedWs,
    SubscribedMultiplexedLongPolling,
    SubscribedMultiplexedWsDynamic,
}

/// The subset of counters that are broken down per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChannelCounter {
    Published,
    Subscribed,
    SubscribedMultiplexedWs,
    SubscribedMultiplexedLongPolling,
}

/// Sparse counters for one time bucket.
///
/// A counter is present in its map only once its event has been recorded at
/// least once; an absent counter reads as zero and stays absent in
/// [`CounterBuffer::to_snapshot`]. Equality compares the bucket key and every
/// counter by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CounterBuffer {
    bucket_key: BucketKey,
    global: BTreeMap<GlobalCounter, u64>,
    per_channel: BTreeMap<ChannelId, BTreeMap<ChannelCounter, u64>>,
}

impl CounterBuffer {
    #[must_use]
    pub const fn new(bucket_key: BucketKey) -> Self {
        Self {
            bucket_key,
            global: BTreeMap::new(),
            per_channel: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn bucket_key(&self) -> BucketKey {
        self.bucket_key
    }

    pub fn new_connection(&mut self) {
        self.bump_global(GlobalCounter::ConnectionsOpened, 1);
    }

    pub fn connection_closed(&mut self) {
        self.bump_global(GlobalCounter::ConnectionsClosed, 1);
    }

    pub fn message_published(&mut self, channel: &str) {
        self.bump_global(GlobalCounter::Published, 1);
        self.bump_channel(channel, ChannelCounter::Published);
    }

    pub fn channel_subscribed(&mut self, channel: &str) {
        self.bump_global(GlobalCounter::Subscribed, 1);
        self.bump_channel(channel, ChannelCounter::Subscribed);
    }

    pub fn channels_subscribed_multiplexed_ws<S>(&mut self, channels: &[S])
    where
        S: AsRef<str>,
    {
        self.bump_multiplexed(
            channels,
            GlobalCounter::SubscribedMultiplexedWs,
            ChannelCounter::SubscribedMultiplexedWs,
        );
    }

    pub fn channels_subscribed_multiplexed_long_polling<S>(&mut self, channels: &[S])
    where
        S: AsRef<str>,
    {
        self.bump_multiplexed(
            channels,
            GlobalCounter::SubscribedMultiplexedLongPolling,
            ChannelCounter::SubscribedMultiplexedLongPolling,
        );
    }

    /// Dynamic subscriptions are counted globally only; a descriptor does
    /// not name a single channel.
    pub fn channels_subscribed_multiplexed_ws_dynamic<D>(&mut self, descriptors: &[D]) {
        self.bump_global(
            GlobalCounter::SubscribedMultiplexedWsDynamic,
            len_u64(descriptors.len()),
        );
    }

    /// Recorded value of a global counter, `None` when never recorded.
    #[must_use]
    pub fn global(&self, counter: GlobalCounter) -> Option<u64> {
        self.global.get(&counter).copied()
    }

    /// Recorded value of a per-channel counter, `None` when never recorded.
    #[must_use]
    pub fn channel(&self, channel: &str, counter: ChannelCounter) -> Option<u64> {
        self.per_channel
            .get(channel)
            .and_then(|counters| counters.get(&counter).copied())
    }

    /// Open connections in this bucket: opened minus closed. Negative when
    /// more connections closed here than were opened here.
    #[must_use]
    pub fn connections(&self) -> i64 {
        let opened = self.global(GlobalCounter::ConnectionsOpened).unwrap_or(0);
        let closed = self.global(GlobalCounter::ConnectionsClosed).unwrap_or(0);
        i64::try_from(opened)
            .unwrap_or(i64::MAX)
            .saturating_sub(i64::try_from(closed).unwrap_or(i64::MAX))
    }

    #[must_use]
    pub fn active_channel_count(&self) -> usize {
        self.per_channel.len()
    }

    pub fn active_channels(&self) -> impl Iterator<Item = &str> {
        self.per_channel.keys().map(String::as_str)
    }

    #[must_use]
    pub fn to_snapshot(&self) -> BufferSnapshot {
        let global = GlobalSnapshot {
            active_channels: self.active_channel_count(),
            connections: self.has_connection_events().then(|| self.connections()),
            connections_opened: self.global(GlobalCounter::ConnectionsOpened),
            connections_closed: self.global(GlobalCounter::ConnectionsClosed),
            published: self.global(GlobalCounter::Published),
            subscribed: self.global(GlobalCounter::Subscribed),
            subscribed_multiplexed_ws: self.global(GlobalCounter::SubscribedMultiplexedWs),
            subscribed_multiplexed_long_polling: self
                .global(GlobalCounter::SubscribedMultiplexedLongPolling),
            subscribed_multiplexed_ws_dynamic: self
                .global(GlobalCounter::SubscribedMultiplexedWsDynamic),
        };
        let channels = self
            .per_channel
            .iter()
            .map(|(channel, counters)| {
                let read = |counter: ChannelCounter| counters.get(&counter).copied();
                (
                    channel.clone(),
                    ChannelSnapshot {
                        published: read(ChannelCounter::Published),
                        subscribed: read(ChannelCounter::Subscribed),
                        subscribed_multiplexed_ws: read(ChannelCounter::SubscribedMultiplexedWs),
                        subscribed_multiplexed_long_polling: read(
                            ChannelCounter::SubscribedMultiplexedLongPolling,
                        ),
                    },
                )
            })
            .collect();

        BufferSnapshot {
            time: self.bucket_key,
            global,
            channels,
        }
    }

    fn has_connection_events(&self) -> bool {
        self.global.contains_key(&GlobalCounter::ConnectionsOpened)
            || self.global.contains_key(&GlobalCounter::ConnectionsClosed)
    }

    fn bump_multiplexed<S>(&mut self, channels: &[S], global: GlobalCounter, per: ChannelCounter)
    where
        S: AsRef<str>,
    {
        self.bump_global(global, len_u64(channels.len()));
        for channel in channels {
            self.bump_channel(channel.as_ref(), per);
        }
    }

    fn bump_global(&mut self, counter: GlobalCounter, by: u64) {
        // An empty batch records nothing, so the counter stays absent.
        if by == 0 {
            return;
        }
        let value = self.global.entry(counter).or_insert(0);
        *value = value.saturating_add(by);
    }

    fn bump_channel(&mut self, channel: &str, counter: ChannelCounter) {
        if let Some(counters) = self.per_channel.get_mut(channel) {
            let value = counters.entry(counter).or_insert(0);
            *value = value.saturating_add(1);
            return;
        }
        self.per_channel
            .insert(channel.to_owned(), BTreeMap::from([(counter, 1)]));
    }
}

fn len_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}
