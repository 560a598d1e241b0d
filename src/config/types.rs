use std::num::NonZeroUsize;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::stats::{DEFAULT_AUTO_EVICT, Resolution, StatsSettings};

/// On-disk configuration. Every field is optional so CLI flags can fill
/// the gaps.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StatsConfigFile {
    #[serde(alias = "resolution")]
    pub resolution_seconds: Option<ResolutionValue>,
    #[serde(alias = "keep")]
    pub keep_buckets: Option<usize>,
    pub auto_evict: Option<bool>,
}

/// Resolution as written in a config file: a number, or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResolutionValue {
    Seconds(f64),
    Text(String),
}

impl ResolutionValue {
    /// # Errors
    ///
    /// Returns an error when the value is not numeric or is below one
    /// second.
    pub fn resolve(&self) -> Result<Resolution, ConfigError> {
        match self {
            ResolutionValue::Seconds(secs) => Resolution::from_secs_f64(*secs),
            ResolutionValue::Text(text) => text.parse(),
        }
    }
}

impl StatsConfigFile {
    /// Validates the file on its own, without CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns an error when the resolution is missing or invalid, or when
    /// `keep_buckets` is zero.
    pub fn to_settings(&self) -> Result<StatsSettings, ConfigError> {
        let resolution = self
            .resolution_seconds
            .as_ref()
            .ok_or(ConfigError::MissingResolution)?
            .resolve()?;
        Ok(StatsSettings::new(resolution)
            .with_keep_buckets(self.validated_keep_buckets()?)
            .with_auto_evict(self.auto_evict.unwrap_or(DEFAULT_AUTO_EVICT)))
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::KeepBucketsZero`] when set to zero.
    pub fn validated_keep_buckets(&self) -> Result<Option<NonZeroUsize>, ConfigError> {
        self.keep_buckets
            .map(|keep| NonZeroUsize::new(keep).ok_or(ConfigError::KeepBucketsZero))
            .transpose()
    }
}
