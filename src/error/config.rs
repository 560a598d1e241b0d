use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing resolution_seconds (set --resolution or provide it in config).")]
    MissingResolution,
    #[error("Invalid resolution '{value}'. Expected a number of seconds >= 1.")]
    ResolutionNotNumeric { value: String },
    #[error("Resolution must be a finite number of seconds >= 1, got {value}.")]
    ResolutionTooSmall { value: f64 },
    #[error("Resolution {value} is finer than one millisecond.")]
    ResolutionTooPrecise { value: f64 },
    #[error("Config 'keep_buckets' must be >= 1.")]
    KeepBucketsZero,
    #[error("Invalid keep_buckets '{value}': {source}")]
    InvalidKeepBuckets {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Failed to read config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON config '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported config extension '{ext}'. Use .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Config file must have .toml or .json extension.")]
    MissingExtension,
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
