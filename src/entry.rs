use std::sync::Arc;

use clap::Parser;
use clap::error::ErrorKind;

use crate::args::CliArgs;
use crate::config::{load_config, resolve_settings};
use crate::error::{AppError, AppResult};
use crate::events::{read_event_log, replay_events};
use crate::report::{IndexReport, write_report};
use crate::stats::{ManualClock, StatsIndex, StatsSettings};

/// Runs the `chanstats` command line.
///
/// # Errors
///
/// Returns an error when arguments or configuration are invalid, the event
/// log cannot be read, or the report cannot be written.
pub fn run() -> AppResult<()> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.print()?;
            return Ok(());
        }
        Err(err) => return Err(AppError::from(err)),
    };

    crate::logger::init_logging(args.verbose, args.no_color);

    let file = load_config(args.config.as_deref())?;
    let settings = resolve_settings(file.as_ref(), &args).map_err(|err| {
        tracing::error!("Invalid stats configuration: {}", err);
        AppError::config(err)
    })?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(replay_and_report(&args, settings))
}

async fn replay_and_report(args: &CliArgs, settings: StatsSettings) -> AppResult<()> {
    let events = read_event_log(&args.events).await?;

    let clock = Arc::new(ManualClock::default());
    let mut index = StatsIndex::with_clock(settings, clock.clone());
    let applied = replay_events(&mut index, &clock, &events);
    let evicted = index.evict_old();
    tracing::info!(
        "Replayed {} events into {} buckets ({} evicted at finish)",
        applied,
        index.len(),
        evicted
    );

    let report = IndexReport::from_index(&index);
    write_report(&report, args.output.as_deref(), args.pretty).await
}
