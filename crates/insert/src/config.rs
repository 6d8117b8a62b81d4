//! Insert pipeline configuration
//!
//! TOML-based with sensible defaults; a missing file section should just
//! work. Only the insert path's own knobs live here - cluster topology and
//! storage configuration belong to their collaborators.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default insert timeout in milliseconds
const DEFAULT_INSERT_TIMEOUT_MS: u64 = 15_000;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parsed but make no sense together
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Insert pipeline configuration
///
/// # Example
///
/// ```
/// use std::str::FromStr;
/// use pulse_insert::InsertConfig;
///
/// let config = InsertConfig::from_str("pool_count = 4\nts_max = 2000000000").unwrap();
/// assert_eq!(config.pool_count, 4);
/// assert_eq!(config.insert_timeout_ms, 15_000);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InsertConfig {
    /// Deadline for a whole insert job, fan-out to reply
    pub insert_timeout_ms: u64,

    /// Lowest accepted point timestamp
    pub ts_min: i64,

    /// Highest accepted point timestamp
    pub ts_max: i64,

    /// Number of pools in the cluster
    pub pool_count: u16,
}

impl Default for InsertConfig {
    fn default() -> Self {
        Self {
            insert_timeout_ms: DEFAULT_INSERT_TIMEOUT_MS,
            ts_min: 0,
            ts_max: i64::MAX,
            pool_count: 1,
        }
    }
}

impl FromStr for InsertConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

impl InsertConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        contents.parse()
    }

    /// Check cross-field consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_count == 0 {
            return Err(ConfigError::Invalid("pool_count must be at least 1"));
        }
        if self.ts_min > self.ts_max {
            return Err(ConfigError::Invalid("ts_min must not exceed ts_max"));
        }
        if self.insert_timeout_ms == 0 {
            return Err(ConfigError::Invalid("insert_timeout_ms must be non-zero"));
        }
        Ok(())
    }

    /// The job deadline as a `Duration`
    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.insert_timeout_ms)
    }

    /// True when `ts` falls inside the accepted window
    #[inline]
    pub fn valid_ts(&self, ts: i64) -> bool {
        ts >= self.ts_min && ts <= self.ts_max
    }
}
