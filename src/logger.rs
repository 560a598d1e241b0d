use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the global `tracing` subscriber for the `chanstats` binary.
///
/// Filter precedence: `CHANSTATS_LOG`, then `RUST_LOG`, then `debug` when
/// `verbose` is set and `info` otherwise. An unparsable directive falls back
/// to `info`. Logs go to stderr so stdout carries only the JSON report.
/// Calling this twice keeps the first subscriber and reports the second
/// attempt on stderr.
pub fn init_logging(verbose: bool, no_color: bool) {
    let filter = std::env::var("CHANSTATS_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| {
                if verbose {
                    EnvFilter::new("debug")
                } else {
                    EnvFilter::new("info")
                }
            },
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
        );

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}
