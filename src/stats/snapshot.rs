use std::collections::BTreeMap;

use serde::Serialize;

use super::bucket::BucketKey;
use super::buffer::ChannelId;

/// Exported, read-only view of one bucket's counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BufferSnapshot {
    pub time: BucketKey,
    pub global: GlobalSnapshot,
    pub channels: BTreeMap<ChannelId, ChannelSnapshot>,
}

/// Global counters. `None` means the counter was never recorded and is
/// omitted from serialized output; `active_channels` is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GlobalSnapshot {
    pub active_channels: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections_opened: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections_closed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribed_multiplexed_ws: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribed_multiplexed_long_polling: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribed_multiplexed_ws_dynamic: Option<u64>,
}

impl GlobalSnapshot {
    /// Adds another bucket's recorded counters into this one. Counters
    /// absent on both sides stay absent. `active_channels` is left alone
    /// since distinct channels cannot be summed.
    pub fn accumulate(&mut self, other: &GlobalSnapshot) {
        self.connections = sum_signed(self.connections, other.connections);
        self.connections_opened = sum(self.connections_opened, other.connections_opened);
        self.connections_closed = sum(self.connections_closed, other.connections_closed);
        self.published = sum(self.published, other.published);
        self.subscribed = sum(self.subscribed, other.subscribed);
        self.subscribed_multiplexed_ws =
            sum(self.subscribed_multiplexed_ws, other.subscribed_multiplexed_ws);
        self.subscribed_multiplexed_long_polling = sum(
            self.subscribed_multiplexed_long_polling,
            other.subscribed_multiplexed_long_polling,
        );
        self.subscribed_multiplexed_ws_dynamic = sum(
            self.subscribed_multiplexed_ws_dynamic,
            other.subscribed_multiplexed_ws_dynamic,
        );
    }
}

/// Per-channel counters, sparse the same way as [`GlobalSnapshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChannelSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribed_multiplexed_ws: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribed_multiplexed_long_polling: Option<u64>,
}

fn sum(left: Option<u64>, right: Option<u64>) -> Option<u64> {
    match (left, right) {
        (Some(a), Some(b)) => Some(a.saturating_add(b)),
        (Some(a), None) | (None, Some(a)) => Some(a),
        (None, None) => None,
    }
}

fn sum_signed(left: Option<i64>, right: Option<i64>) -> Option<i64> {
    match (left, right) {
        (Some(a), Some(b)) => Some(a.saturating_add(b)),
        (Some(a), None) | (None, Some(a)) => Some(a),
        (None, None) => None,
    }
}
