use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::error::ConfigError;

const MILLIS_PER_SECOND: u64 = 1_000;
const NANOS_PER_MILLI: u32 = 1_000_000;
const NANOS_PER_MICRO: u32 = 1_000;

/// Width of a time bucket.
///
/// Stored as whole milliseconds so fractional resolutions such as `1.5`
/// seconds stay exact and bucket keys never depend on floating-point
/// comparison. A `Resolution` can only be obtained through validation, so
/// holding one proves it is at least one second wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution(NonZeroU64);

impl Resolution {
    /// Validates a resolution given in (possibly fractional) seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ResolutionTooSmall`] when `secs` is NaN,
    /// infinite, or below one second, and
    /// [`ConfigError::ResolutionTooPrecise`] when it is not a whole number
    /// of milliseconds.
    pub fn from_secs_f64(secs: f64) -> Result<Self, ConfigError> {
        if !secs.is_finite() || secs < 1.0 {
            return Err(ConfigError::ResolutionTooSmall { value: secs });
        }
        let Ok(duration) = Duration::try_from_secs_f64(secs) else {
            return Err(ConfigError::ResolutionTooSmall { value: secs });
        };
        let duration = round_to_micros(duration);
        if duration.subsec_nanos() % NANOS_PER_MILLI != 0 {
            return Err(ConfigError::ResolutionTooPrecise { value: secs });
        }
        u64::try_from(duration.as_millis())
            .ok()
            .and_then(NonZeroU64::new)
            .map(Resolution)
            .ok_or(ConfigError::ResolutionTooSmall { value: secs })
    }

    /// Validates a resolution given in whole seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ResolutionTooSmall`] when `secs` is zero.
    pub fn from_secs(secs: u64) -> Result<Self, ConfigError> {
        secs.checked_mul(MILLIS_PER_SECOND)
            .and_then(NonZeroU64::new)
            .map(Resolution)
            .ok_or(ConfigError::ResolutionTooSmall {
                value: Duration::from_secs(secs).as_secs_f64(),
            })
    }

    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0.get()
    }

    #[must_use]
    pub const fn as_duration(self) -> Duration {
        Duration::from_millis(self.0.get())
    }

    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        self.as_duration().as_secs_f64()
    }

    /// Maps a timestamp (time since the Unix epoch) to the key of the bucket
    /// containing it: `floor(t / resolution) * resolution`.
    #[must_use]
    pub fn bucket_of(self, timestamp: Duration) -> BucketKey {
        let millis = u64::try_from(timestamp.as_millis()).unwrap_or(u64::MAX);
        let window = millis / self.0;
        BucketKey(window.saturating_mul(self.0.get()))
    }
}

impl FromStr for Resolution {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let secs: f64 = trimmed
            .parse()
            .ok()
            .ok_or_else(|| ConfigError::ResolutionNotNumeric {
                value: trimmed.to_owned(),
            })?;
        Resolution::from_secs_f64(secs)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_seconds(f, self.0.get())
    }
}

/// Identifier of one time bucket: the bucket's start, in milliseconds since
/// the Unix epoch, already truncated to the index resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BucketKey(u64);

impl BucketKey {
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Builds a key from whole seconds. Saturates on overflow.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(MILLIS_PER_SECOND))
    }

    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }

    #[must_use]
    pub const fn is_whole_second(self) -> bool {
        self.0 % MILLIS_PER_SECOND == 0
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_seconds(f, self.0)
    }
}

/// Whole-second keys serialize as integers, others as fractional seconds.
impl Serialize for BucketKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.is_whole_second() {
            serializer.serialize_u64(self.0 / MILLIS_PER_SECOND)
        } else {
            serializer.serialize_f64(self.as_duration().as_secs_f64())
        }
    }
}

// Decimal inputs such as 1.5 or 2.001 are not exact in binary; snapping to
// the nearest microsecond absorbs that noise before the millisecond check.
fn round_to_micros(duration: Duration) -> Duration {
    let nanos = duration.subsec_nanos();
    let micros = nanos / NANOS_PER_MICRO;
    let rounded = if nanos % NANOS_PER_MICRO >= NANOS_PER_MICRO / 2 {
        micros.saturating_add(1)
    } else {
        micros
    };
    Duration::from_secs(duration.as_secs())
        .saturating_add(Duration::from_micros(u64::from(rounded)))
}

fn write_seconds(f: &mut fmt::Formatter<'_>, millis: u64) -> fmt::Result {
    let secs = millis / MILLIS_PER_SECOND;
    let frac = millis % MILLIS_PER_SECOND;
    if frac == 0 {
        write!(f, "{}", secs)
    } else {
        let text = format!("{}.{:03}", secs, frac);
        f.write_str(text.trim_end_matches('0'))
    }
}
