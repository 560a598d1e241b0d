use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::stats::Resolution;

use super::parsers::{parse_keep_buckets, parse_resolution};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Replay pub/sub server events into time-bucketed counters and print a JSON report."
)]
pub struct CliArgs {
    /// JSON-lines event log to replay
    #[arg(long = "events", short = 'e')]
    pub events: PathBuf,

    /// Path to config file (TOML or JSON)
    #[arg(long = "config", short = 'c')]
    pub config: Option<String>,

    /// Bucket width in seconds (>= 1, fractional values allowed)
    #[arg(
        long = "resolution",
        short = 'r',
        env = "CHANSTATS_RESOLUTION",
        value_parser = parse_resolution
    )]
    pub resolution: Option<Resolution>,

    /// Retain only the N most recent buckets
    #[arg(long = "keep-buckets", short = 'k', value_parser = parse_keep_buckets)]
    pub keep_buckets: Option<NonZeroUsize>,

    /// Only evict when the replay finishes, not after every event
    #[arg(long = "no-auto-evict")]
    pub no_auto_evict: bool,

    /// Pretty-print the JSON report
    #[arg(long = "pretty")]
    pub pretty: bool,

    /// Write the report to a file instead of stdout
    #[arg(long = "output", short = 'o')]
    pub output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long = "verbose", short = 'v')]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color", env = "NO_COLOR")]
    pub no_color: bool,
}
