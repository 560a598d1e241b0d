//! Recorded event logs and their replay into a [`StatsIndex`].
//!
//! A log is JSON lines, one event per line:
//!
//! ```text
//! {"at": 1700000000.25, "event": "message_published", "channel": "news"}
//! {"at": 1700000001, "event": "multiplexed_ws", "channels": ["a", "b"]}
//! ```
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::{AppError, AppResult, EventError};
use crate::stats::{ManualClock, StatsIndex};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StatsEvent {
    ConnectionOpened,
    ConnectionClosed,
    MessagePublished { channel: String },
    ChannelSubscribed { channel: String },
    MultiplexedWs { channels: Vec<String> },
    MultiplexedLongPolling { channels: Vec<String> },
    MultiplexedWsDynamic { descriptors: Vec<serde_json::Value> },
}

impl StatsEvent {
    /// Records this event in the bucket for the index's current time.
    pub fn apply(&self, index: &mut StatsIndex) {
        match self {
            StatsEvent::ConnectionOpened => index.new_connection(),
            StatsEvent::ConnectionClosed => index.connection_closed(),
            StatsEvent::MessagePublished { channel } => index.message_published(channel),
            StatsEvent::ChannelSubscribed { channel } => index.channel_subscribed(channel),
            StatsEvent::MultiplexedWs { channels } => {
                index.channels_subscribed_multiplexed_ws(channels.as_slice());
            }
            StatsEvent::MultiplexedLongPolling { channels } => {
                index.channels_subscribed_multiplexed_long_polling(channels.as_slice());
            }
            StatsEvent::MultiplexedWsDynamic { descriptors } => {
                index.channels_subscribed_multiplexed_ws_dynamic(descriptors.as_slice());
            }
        }
    }
}

/// An event together with the moment it happened.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEvent {
    pub at: Duration,
    pub event: StatsEvent,
}

#[derive(Debug, Deserialize)]
struct EventLine {
    at: f64,
    #[serde(flatten)]
    event: StatsEvent,
}

/// Parses one log line. Blank lines yield `None`.
///
/// # Errors
///
/// Returns an error when the line is not a valid event or its timestamp is
/// negative or not finite.
pub fn parse_event_line(line: usize, text: &str) -> Result<Option<TimedEvent>, EventError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let parsed: EventLine = serde_json::from_str(trimmed)
        .map_err(|err| EventError::Malformed { line, source: err })?;
    let Ok(at) = Duration::try_from_secs_f64(parsed.at) else {
        return Err(EventError::InvalidTimestamp {
            line,
            at: parsed.at,
        });
    };
    Ok(Some(TimedEvent {
        at,
        event: parsed.event,
    }))
}

/// Reads a JSON-lines event log.
///
/// # Errors
///
/// Returns an error if the file cannot be read or any line fails to parse.
pub async fn read_event_log(path: &Path) -> AppResult<Vec<TimedEvent>> {
    let file = tokio::fs::File::open(path).await.map_err(|err| {
        AppError::event(EventError::Open {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    let mut lines = BufReader::new(file).lines();
    let mut events = Vec::new();
    let mut line_no: usize = 0;
    while let Some(line) = lines.next_line().await.map_err(|err| {
        AppError::event(EventError::Read {
            path: path.to_path_buf(),
            source: err,
        })
    })? {
        line_no = line_no.saturating_add(1);
        if let Some(event) = parse_event_line(line_no, &line)? {
            events.push(event);
        }
    }
    tracing::debug!("Read {} events from {}", events.len(), path.display());
    Ok(events)
}

/// Replays events into `index`, moving `clock` to each event's timestamp
/// first. `index` must read its time from `clock`. Returns the number of
/// events applied.
pub fn replay_events(
    index: &mut StatsIndex,
    clock: &ManualClock,
    events: &[TimedEvent],
) -> usize {
    for timed in events {
        clock.set(timed.at);
        timed.event.apply(index);
    }
    events.len()
}
