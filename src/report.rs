//! Whole-index reports for dashboards and exports.
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Serialize;

use crate::error::AppResult;
use crate::stats::{
    BucketKey, BufferSnapshot, CounterBuffer, GlobalSnapshot, Resolution, StatsIndex,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexReport {
    pub resolution_seconds: f64,
    pub buckets: Vec<BufferSnapshot>,
    pub totals: GlobalSnapshot,
}

impl IndexReport {
    #[must_use]
    pub fn from_index(index: &StatsIndex) -> Self {
        Self::from_buckets(index.resolution(), index.snapshot())
    }

    /// Builds a report from retained buckets, in ascending key order.
    #[must_use]
    pub fn from_buckets(
        resolution: Resolution,
        buckets: &BTreeMap<BucketKey, CounterBuffer>,
    ) -> Self {
        let snapshots: Vec<BufferSnapshot> =
            buckets.values().map(CounterBuffer::to_snapshot).collect();
        let totals = summarize(buckets.values());
        Self {
            resolution_seconds: resolution.as_secs_f64(),
            buckets: snapshots,
            totals,
        }
    }
}

/// Sums global counters across buffers. `active_channels` counts distinct
/// channels seen in any of them.
pub fn summarize<'buf, I>(buffers: I) -> GlobalSnapshot
where
    I: IntoIterator<Item = &'buf CounterBuffer>,
{
    let mut totals = GlobalSnapshot::default();
    let mut channels: BTreeSet<&str> = BTreeSet::new();
    for buffer in buffers {
        totals.accumulate(&buffer.to_snapshot().global);
        channels.extend(buffer.active_channels());
    }
    totals.active_channels = channels.len();
    totals
}

/// Serializes a report as JSON.
///
/// # Errors
///
/// Returns an error when serialization fails.
pub fn render_json(report: &IndexReport, pretty: bool) -> AppResult<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    Ok(rendered)
}

/// Writes a rendered report to `output`, or stdout when no path is given.
///
/// # Errors
///
/// Returns an error when serialization or the write fails.
pub async fn write_report(
    report: &IndexReport,
    output: Option<&Path>,
    pretty: bool,
) -> AppResult<()> {
    let rendered = render_json(report, pretty)?;
    match output {
        Some(path) => {
            tokio::fs::write(path, format!("{}\n", rendered)).await?;
            tracing::info!(
                "Wrote report for {} buckets to {}",
                report.buckets.len(),
                path.display()
            );
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{ManualClock, StatsSettings};
    use std::sync::Arc;
    use std::time::Duration;

    fn sample_index() -> Result<StatsIndex, String> {
        let settings =
            StatsSettings::from_secs_f64(1.0).map_err(|err| format!("settings: {}", err))?;
        let clock = Arc::new(ManualClock::from_secs(1));
        let mut index = StatsIndex::with_clock(settings, clock.clone());
        index.new_connection();
        index.message_published("a");
        clock.set(Duration::from_secs(2));
        index.new_connection();
        index.connection_closed();
        index.channel_subscribed("b");
        index.message_published("a");
        Ok(index)
    }

    #[test]
    fn report_lists_buckets_in_key_order() -> Result<(), String> {
        let index = sample_index()?;
        let report = IndexReport::from_index(&index);
        let times: Vec<BucketKey> = report.buckets.iter().map(|bucket| bucket.time).collect();
        if times != [BucketKey::from_secs(1), BucketKey::from_secs(2)] {
            return Err(format!("Unexpected bucket order {:?}", times));
        }
        Ok(())
    }

    #[test]
    fn totals_sum_counters_and_keep_absent_ones_absent() -> Result<(), String> {
        let index = sample_index()?;
        let totals = IndexReport::from_index(&index).totals;
        let expected = GlobalSnapshot {
            active_channels: 2,
            connections: Some(1),
            connections_opened: Some(2),
            connections_closed: Some(1),
            published: Some(2),
            subscribed: Some(1),
            ..GlobalSnapshot::default()
        };
        if totals != expected {
            return Err(format!("Unexpected totals {:?}", totals));
        }
        Ok(())
    }

    #[test]
    fn render_json_omits_unrecorded_counters() -> Result<(), String> {
        let index = sample_index()?;
        let rendered = render_json(&IndexReport::from_index(&index), false)
            .map_err(|err| format!("render failed: {}", err))?;
        if rendered.contains("subscribed_multiplexed") {
            return Err(format!("Unrecorded counters leaked: {}", rendered));
        }
        if !rendered.contains("\"resolution_seconds\":1.0") {
            return Err(format!("Missing resolution: {}", rendered));
        }
        Ok(())
    }

    #[test]
    fn empty_index_reports_zero_active_channels() -> Result<(), String> {
        let settings =
            StatsSettings::from_secs_f64(5.0).map_err(|err| format!("settings: {}", err))?;
        let index = StatsIndex::new(settings);
        let report = IndexReport::from_index(&index);
        if !report.buckets.is_empty() || report.totals != GlobalSnapshot::default() {
            return Err(format!("Unexpected report {:?}", report));
        }
        Ok(())
    }
}
