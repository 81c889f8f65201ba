//! Pipeline configuration
//!
//! One TOML document configures every stage. Every section and key is
//! optional; missing values take the defaults below.
//!
//! ```toml
//! request_deadline_secs = 120
//!
//! [guardrails]
//! max_time_range_years = 5.0
//!
//! [cache]
//! max_entries = 500
//!
//! [executor]
//! max_concurrent_buckets = 8
//!
//! [geocoder]
//! enabled = false
//!
//! [telemetry]
//! filter = "geo_core=debug,info"
//! json = true
//! ```

use crate::telemetry::TelemetryConfig;
use geo_cache::CacheConfig;
use geo_guardrail::GuardrailPolicy;
use geo_location::GeocoderConfig;
use geo_workflow::ExecutorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        /// Path attempted
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Not valid TOML or wrong types
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed but unusable values
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Overall per-request deadline in seconds
    pub request_deadline_secs: u64,
    /// Policy limits
    pub guardrails: GuardrailPolicy,
    /// Artifact cache sizing
    pub cache: CacheConfig,
    /// Bucket fan-out
    pub executor: ExecutorConfig,
    /// Remote geocoder
    pub geocoder: GeocoderConfig,
    /// Log output
    pub telemetry: TelemetryConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_deadline_secs: 300,
            guardrails: GuardrailPolicy::default(),
            cache: CacheConfig::default(),
            executor: ExecutorConfig::default(),
            geocoder: GeocoderConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`PipelineConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// With request deadline
    #[inline]
    #[must_use]
    pub fn with_deadline_secs(mut self, secs: u64) -> Self {
        self.request_deadline_secs = secs;
        self
    }

    /// With guardrail policy
    #[inline]
    #[must_use]
    pub fn with_guardrails(mut self, policy: GuardrailPolicy) -> Self {
        self.guardrails = policy;
        self
    }

    /// With cache sizing
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// With geocoder settings
    #[inline]
    #[must_use]
    pub fn with_geocoder(mut self, geocoder: GeocoderConfig) -> Self {
        self.geocoder = geocoder;
        self
    }

    /// Overall request deadline
    #[inline]
    #[must_use]
    pub fn request_deadline(&self) -> Duration {
        Duration::from_secs(self.request_deadline_secs)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_deadline_secs == 0 {
            return Err(ConfigError::Invalid("request_deadline_secs must be positive".into()));
        }
        if self.cache.max_entries == 0 {
            return Err(ConfigError::Invalid("cache.max_entries must be positive".into()));
        }
        if self.executor.max_concurrent_buckets == 0 {
            return Err(ConfigError::Invalid(
                "executor.max_concurrent_buckets must be positive".into(),
            ));
        }
        if self.executor.bucket_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "executor.bucket_timeout_secs must be positive".into(),
            ));
        }
        let policy = &self.guardrails;
        if !(policy.max_time_range_years.is_finite() && policy.max_time_range_years > 0.0) {
            return Err(ConfigError::Invalid(
                "guardrails.max_time_range_years must be a positive number".into(),
            ));
        }
        if !(policy.max_aoi_degrees.is_finite() && policy.max_aoi_degrees > 0.0) {
            return Err(ConfigError::Invalid(
                "guardrails.max_aoi_degrees must be a positive number".into(),
            ));
        }
        Ok(())
    }
}
