//! Tracing subscriber setup for the binary
//!
//! Libraries only emit `tracing` events; installing a subscriber is left to
//! the process entry point.

use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Log output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl TelemetryConfig {
    /// With filter directive
    #[inline]
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// With JSON output
    #[inline]
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Filter to install: `RUST_LOG` wins over the configured directive
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.filter))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Install the global subscriber
///
/// Returns `false` when a subscriber was already installed, e.g. by a test
/// harness; the existing one is left in place.
pub fn init_tracing(config: &TelemetryConfig) -> bool {
    let (json, text) = if config.json {
        (Some(fmt::layer().json().with_target(true)), None)
    } else {
        (None, Some(fmt::layer().with_target(true)))
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(json)
        .with(text)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TelemetryConfig::default();
        assert_eq!(config.filter, "info");
        assert!(!config.json);
    }

    #[test]
    fn second_init_is_harmless() {
        let config = TelemetryConfig::default().with_json(true);
        let _ = init_tracing(&config);
        assert!(!init_tracing(&config));
    }

    #[test]
    fn bad_directive_falls_back() {
        let config = TelemetryConfig::default().with_filter("[[[not a filter");
        // Must not panic whatever RUST_LOG holds
        let _ = config.env_filter();
    }
}
