use std::num::NonZeroUsize;

use crate::error::ConfigError;
use crate::stats::Resolution;

pub(crate) fn parse_resolution(s: &str) -> Result<Resolution, ConfigError> {
    s.parse::<Resolution>()
}

pub(crate) fn parse_keep_buckets(s: &str) -> Result<NonZeroUsize, ConfigError> {
    let trimmed = s.trim();
    let value: usize = trimmed
        .parse()
        .map_err(|err| ConfigError::InvalidKeepBuckets {
            value: trimmed.to_owned(),
            source: err,
        })?;
    NonZeroUsize::new(value).ok_or(ConfigError::KeepBucketsZero)
}
