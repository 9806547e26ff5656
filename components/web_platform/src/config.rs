//! Tester configuration.
//!
//! Delays are sampled uniformly from inclusive millisecond ranges. The
//! defaults match the behavior scripts observe from the tester: a sort
//! request settles after one to three seconds and the `getlocation` event
//! fires after five to seven.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors loading or validating a [`TesterConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The config document is not valid JSON for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A delay range has `min_ms > max_ms`
    #[error("invalid delay range for {field}: min {min_ms}ms exceeds max {max_ms}ms")]
    InvalidRange {
        /// Name of the offending field
        field: &'static str,
        /// Lower bound as configured
        min_ms: u64,
        /// Upper bound as configured
        max_ms: u64,
    },
}

/// An inclusive range of delays in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    /// Shortest delay
    pub min_ms: u64,
    /// Longest delay
    pub max_ms: u64,
}

impl DelayRange {
    /// Creates a range. Validation happens in [`TesterConfig::validate`].
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// A range that always yields `ms`.
    pub const fn fixed(ms: u64) -> Self {
        Self::new(ms, ms)
    }

    /// Draws a delay from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        if self.min_ms >= self.max_ms {
            return self.min_ms;
        }
        rng.gen_range(self.min_ms..=self.max_ms)
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.min_ms > self.max_ms {
            return Err(ConfigError::InvalidRange {
                field,
                min_ms: self.min_ms,
                max_ms: self.max_ms,
            });
        }
        Ok(())
    }
}

/// Configuration for a [`WebIdlTester`](crate::WebIdlTester).
///
/// # Examples
///
/// ```
/// use web_platform::{DelayRange, TesterConfig};
///
/// let config = TesterConfig::from_json_str(r#"{ "seed": 7 }"#).unwrap();
/// assert_eq!(config.seed, Some(7));
/// assert_eq!(config.sort_delay_ms, DelayRange::new(1000, 3000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TesterConfig {
    /// Delay before a sort request resolves
    pub sort_delay_ms: DelayRange,
    /// Delay before the `getlocation` event is dispatched
    pub event_delay_ms: DelayRange,
    /// Seed for delay sampling; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            sort_delay_ms: DelayRange::new(1000, 3000),
            event_delay_ms: DelayRange::new(5000, 7000),
            seed: None,
        }
    }
}

impl TesterConfig {
    /// Parses and validates a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: TesterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks every delay range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sort_delay_ms.check("sort_delay_ms")?;
        self.event_delay_ms.check("event_delay_ms")
    }

    /// Sets the sampling seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the sort resolution delay range.
    pub fn with_sort_delay(mut self, range: DelayRange) -> Self {
        self.sort_delay_ms = range;
        self
    }

    /// Sets the `getlocation` event delay range.
    pub fn with_event_delay(mut self, range: DelayRange) -> Self {
        self.event_delay_ms = range;
        self
    }

    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
