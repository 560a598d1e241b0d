use crate::args::CliArgs;
use crate::error::ConfigError;
use crate::stats::{DEFAULT_AUTO_EVICT, StatsSettings};

use super::types::StatsConfigFile;

/// Merges CLI flags over an optional config file into validated settings.
/// Flags win over file values.
///
/// # Errors
///
/// Returns an error when no valid resolution is available from either
/// source, or when the file sets `keep_buckets` to zero.
pub fn resolve_settings(
    file: Option<&StatsConfigFile>,
    args: &CliArgs,
) -> Result<StatsSettings, ConfigError> {
    let resolution = match args.resolution {
        Some(resolution) => resolution,
        None => file
            .and_then(|file| file.resolution_seconds.as_ref())
            .ok_or(ConfigError::MissingResolution)?
            .resolve()?,
    };

    let keep_buckets = match args.keep_buckets {
        Some(keep) => Some(keep),
        None => file
            .map(StatsConfigFile::validated_keep_buckets)
            .transpose()?
            .flatten(),
    };

    let auto_evict = !args.no_auto_evict
        && file
            .and_then(|file| file.auto_evict)
            .unwrap_or(DEFAULT_AUTO_EVICT);

    Ok(StatsSettings::new(resolution)
        .with_keep_buckets(keep_buckets)
        .with_auto_evict(auto_evict))
}
