//! Remote place-name lookup
//!
//! [`Geocoder`] is the seam; [`NominatimGeocoder`] talks to any
//! Nominatim-compatible `/search` endpoint.

use async_trait::async_trait;
use geo_plan::{BoundingBox, BoundsError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Geocoder errors
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// Transport or HTTP status failure
    #[error("geocoder request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned no results
    #[error("no geocoding match for '{0}'")]
    NoMatch(String),

    /// Service returned something unparseable
    #[error("invalid geocoder response: {0}")]
    InvalidResponse(String),

    /// Returned box violates bounds
    #[error("geocoder returned invalid bounds: {0}")]
    Bounds(#[from] BoundsError),
}

/// Place name → bounding box lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve one place name
    async fn geocode(&self, name: &str) -> Result<BoundingBox, GeocodeError>;
}

/// Geocoder client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Base URL; `/search` is appended
    pub endpoint: String,
    /// User agent sent with each request (Nominatim usage policy requires one)
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// When false only the fallback table is used
    pub enabled: bool,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: format!("geo-analyst/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 10,
            enabled: true,
        }
    }
}

impl GeocoderConfig {
    /// With endpoint
    #[inline]
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// With timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Disable remote lookups
    #[inline]
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    /// `[south, north, west, east]` as decimal strings
    boundingbox: Vec<String>,
}

/// Nominatim-compatible HTTP geocoder
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    search_url: String,
}

impl NominatimGeocoder {
    /// Build client from configuration
    ///
    /// # Errors
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        let search_url = format!("{}/search", config.endpoint.trim_end_matches('/'));
        tracing::debug!("Created NominatimGeocoder for {}", search_url);

        Ok(Self { client, search_url })
    }

    /// Search endpoint URL
    #[inline]
    #[must_use]
    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, name: &str) -> Result<BoundingBox, GeocodeError> {
        let places: Vec<Place> = self
            .client
            .get(&self.search_url)
            .query(&[("format", "json"), ("limit", "1"), ("q", name)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NoMatch(name.to_string()))?;

        parse_bounding_box(&place.boundingbox)
    }
}

/// Convert Nominatim's `[south, north, west, east]` strings into a box
fn parse_bounding_box(raw: &[String]) -> Result<BoundingBox, GeocodeError> {
    let [south, north, west, east] = raw else {
        return Err(GeocodeError::InvalidResponse(format!(
            "expected 4 boundingbox values, got {}",
            raw.len()
        )));
    };

    let parse = |text: &String| {
        text.trim()
            .parse::<f64>()
            .map_err(|_| GeocodeError::InvalidResponse(format!("'{text}' is not a number")))
    };

    Ok(BoundingBox::new(
        parse(west)?,
        parse(south)?,
        parse(east)?,
        parse(north)?,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn parses_nominatim_order() {
        let bbox = parse_bounding_box(&strings(&["6.39", "6.70", "3.10", "3.70"])).unwrap();
        assert_eq!(bbox.to_array(), [3.10, 6.39, 3.70, 6.70]);
    }

    #[test]
    fn rejects_wrong_arity_and_garbage() {
        assert!(matches!(
            parse_bounding_box(&strings(&["1", "2", "3"])),
            Err(GeocodeError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_bounding_box(&strings(&["a", "2", "3", "4"])),
            Err(GeocodeError::InvalidResponse(_))
        ));
        // Degenerate point result
        assert!(matches!(
            parse_bounding_box(&strings(&["1", "1", "3", "4"])),
            Err(GeocodeError::Bounds(_))
        ));
    }

    #[test]
    fn response_body_deserializes() {
        let body = r#"[{
            "place_id": 1,
            "display_name": "Lagos",
            "boundingbox": ["6.39", "6.70", "3.10", "3.70"]
        }]"#;
        let places: Vec<Place> = serde_json::from_str(body).unwrap();
        assert_eq!(places.len(), 1);
        assert!(parse_bounding_box(&places[0].boundingbox).is_ok());
    }

    #[test]
    fn search_url_trims_trailing_slash() {
        let config = GeocoderConfig::default().with_endpoint("http://localhost:8080/");
        let geocoder = NominatimGeocoder::new(&config).unwrap();
        assert_eq!(geocoder.search_url(), "http://localhost:8080/search");
    }

    #[test]
    fn config_defaults() {
        let config = GeocoderConfig::default();
        assert!(config.enabled);
        assert_eq!(config.timeout_secs, 10);
        assert!(config.user_agent.starts_with("geo-analyst/"));
        assert!(!config.disabled().enabled);
    }
}
