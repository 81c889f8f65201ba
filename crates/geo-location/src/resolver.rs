//! Location resolution
//!
//! Named places go memo → geocoder → fallback table. Explicit boxes are
//! revalidated and returned unchanged; they never reach the geocoder.

use crate::error::LocationError;
use crate::fallback::{self, normalize_name};
use crate::geocoder::{GeocodeError, Geocoder, GeocoderConfig, NominatimGeocoder};
use geo_plan::{BoundingBox, Location};
use moka::future::Cache;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Default number of memoized place names
pub const DEFAULT_MEMO_CAPACITY: u64 = 1024;

/// Resolves [`Location`]s to bounding boxes
#[derive(Clone)]
pub struct LocationResolver {
    geocoder: Option<Arc<dyn Geocoder>>,
    memo: Cache<String, BoundingBox>,
}

impl LocationResolver {
    /// Resolver backed only by the fallback table
    #[must_use]
    pub fn new() -> Self {
        Self {
            geocoder: None,
            memo: Cache::new(DEFAULT_MEMO_CAPACITY),
        }
    }

    /// Resolver for a geocoder configuration
    ///
    /// A disabled configuration yields a fallback-only resolver.
    ///
    /// # Errors
    /// Returns [`GeocodeError`] if the HTTP client cannot be built.
    pub fn from_config(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let resolver = Self::new();
        if !config.enabled {
            return Ok(resolver);
        }
        Ok(resolver.with_geocoder(Arc::new(NominatimGeocoder::new(config)?)))
    }

    /// With a remote geocoder
    #[inline]
    #[must_use]
    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// With a memo capacity (clears existing memo entries)
    #[inline]
    #[must_use]
    pub fn with_memo_capacity(mut self, capacity: u64) -> Self {
        self.memo = Cache::new(capacity);
        self
    }

    /// Whether a remote geocoder is configured
    #[inline]
    #[must_use]
    pub fn has_geocoder(&self) -> bool {
        self.geocoder.is_some()
    }

    /// Resolve a plan location
    ///
    /// # Errors
    /// - [`LocationError::InvalidBounds`] for a malformed explicit box
    /// - [`LocationError::EmptyName`] for a blank name
    /// - [`LocationError::LocationNotFound`] when no source knows the name
    pub async fn resolve(&self, location: &Location) -> Result<BoundingBox, LocationError> {
        match location {
            Location::BBox(bbox) => Self::resolve_coordinates(bbox.to_array()),
            Location::Named(name) => self.resolve_name(name).await,
        }
    }

    /// Validate raw `[west, south, east, north]` coordinates
    ///
    /// # Errors
    /// Returns [`LocationError::InvalidBounds`] on any invariant violation.
    pub fn resolve_coordinates(coords: [f64; 4]) -> Result<BoundingBox, LocationError> {
        Ok(BoundingBox::try_from(coords)?)
    }

    /// Resolve a place name
    ///
    /// # Errors
    /// See [`LocationResolver::resolve`].
    pub async fn resolve_name(&self, name: &str) -> Result<BoundingBox, LocationError> {
        let key = normalize_name(name);
        if key.is_empty() {
            return Err(LocationError::EmptyName);
        }

        if let Some(bbox) = self.memo.get(&key).await {
            tracing::debug!(location = %key, "Location memo hit");
            return Ok(bbox);
        }

        if let Some(geocoder) = &self.geocoder {
            match geocoder.geocode(name.trim()).await {
                Ok(bbox) => {
                    tracing::debug!(location = %key, %bbox, "Geocoded location");
                    self.memo.insert(key, bbox).await;
                    return Ok(bbox);
                }
                Err(e) => {
                    tracing::warn!(
                        location = %key,
                        error = %e,
                        "Geocoding failed, using fallback table"
                    );
                }
            }
        }

        fallback::lookup(&key).ok_or_else(|| LocationError::LocationNotFound {
            name: name.to_string(),
            known: fallback::known_names(),
        })
    }
}

impl Default for LocationResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for LocationResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationResolver")
            .field("has_geocoder", &self.geocoder.is_some())
            .field("memo_entries", &self.memo.entry_count())
            .finish()
    }
}

/// Pad a box by a percentage of its size on every side
///
/// Pads `width·percent/100` on west and east and `height·percent/100` on
/// south and north, clamped to the global coordinate range.
///
/// # Errors
/// Returns [`LocationError::InvalidPadding`] for negative or non-finite
/// percentages.
pub fn expand_bbox(bbox: &BoundingBox, percent: f64) -> Result<BoundingBox, LocationError> {
    if !percent.is_finite() || percent < 0.0 {
        return Err(LocationError::InvalidPadding(percent));
    }
    let dx = bbox.width() * percent / 100.0;
    let dy = bbox.height() * percent / 100.0;
    Ok(bbox.padded(dx, dy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocoder::MockGeocoder;
    use pretty_assertions::assert_eq;

    fn bbox(w: f64, s: f64, e: f64, n: f64) -> BoundingBox {
        BoundingBox::new(w, s, e, n).unwrap()
    }

    #[tokio::test]
    async fn explicit_bbox_skips_geocoder() {
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_geocode().times(0);

        let resolver = LocationResolver::new().with_geocoder(Arc::new(geocoder));
        let expected = bbox(1.0, 2.0, 3.0, 4.0);

        let resolved = resolver.resolve(&Location::BBox(expected)).await.unwrap();
        assert_eq!(resolved, expected);
    }

    #[test]
    fn inverted_coordinates_are_rejected() {
        let result = LocationResolver::resolve_coordinates([10.0, 0.0, 5.0, 1.0]);
        assert!(matches!(result, Err(LocationError::InvalidBounds(_))));

        let result = LocationResolver::resolve_coordinates([0.0, 0.0, 0.0, 1.0]);
        assert!(matches!(result, Err(LocationError::InvalidBounds(_))));
    }

    #[tokio::test]
    async fn geocoder_result_is_memoized() {
        let lagos = bbox(3.0, 6.0, 4.0, 7.0);
        let mut geocoder = MockGeocoder::new();
        geocoder
            .expect_geocode()
            .times(1)
            .returning(move |_| Ok(lagos));

        let resolver = LocationResolver::new().with_geocoder(Arc::new(geocoder));

        assert_eq!(resolver.resolve_name("Lagos").await.unwrap(), lagos);
        // Different spelling, same normalized key
        assert_eq!(resolver.resolve_name("  LAGOS ").await.unwrap(), lagos);
    }

    #[tokio::test]
    async fn geocoder_failure_falls_back_to_table() {
        let mut geocoder = MockGeocoder::new();
        geocoder
            .expect_geocode()
            .returning(|name| Err(GeocodeError::NoMatch(name.to_string())));

        let resolver = LocationResolver::new().with_geocoder(Arc::new(geocoder));
        let resolved = resolver.resolve_name("Nile Delta").await.unwrap();

        assert_eq!(resolved, fallback::lookup("nile delta").unwrap());
    }

    #[tokio::test]
    async fn fallback_results_are_not_memoized() {
        let mut geocoder = MockGeocoder::new();
        geocoder
            .expect_geocode()
            .times(2)
            .returning(|name| Err(GeocodeError::NoMatch(name.to_string())));

        let resolver = LocationResolver::new().with_geocoder(Arc::new(geocoder));
        resolver.resolve_name("Sahara").await.unwrap();
        resolver.resolve_name("Sahara").await.unwrap();
    }

    #[tokio::test]
    async fn unknown_name_lists_every_fallback() {
        let resolver = LocationResolver::new();
        let err = resolver.resolve_name("Atlantis").await.unwrap_err();

        match &err {
            LocationError::LocationNotFound { name, known } => {
                assert_eq!(name, "Atlantis");
                assert_eq!(known, &fallback::known_names());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_not_found());
        assert!(err.to_string().contains("aral sea, beijing"));
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let resolver = LocationResolver::new();
        assert_eq!(
            resolver.resolve_name("   ").await.unwrap_err(),
            LocationError::EmptyName
        );
    }

    #[test]
    fn disabled_config_builds_fallback_only_resolver() {
        let resolver =
            LocationResolver::from_config(&GeocoderConfig::default().disabled()).unwrap();
        assert!(!resolver.has_geocoder());
    }

    #[test]
    fn expand_bbox_pads_symmetrically() {
        let original = bbox(10.0, 20.0, 20.0, 24.0);
        let expanded = expand_bbox(&original, 10.0).unwrap();
        let expected = [9.0, 19.6, 21.0, 24.4];
        for (got, want) in expanded.to_array().iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{got} != {want}");
        }
    }

    #[test]
    fn expand_bbox_clamps_to_globe() {
        let original = bbox(-179.0, -89.0, 179.0, 89.0);
        let expanded = expand_bbox(&original, 50.0).unwrap();
        assert_eq!(expanded, BoundingBox::global());
    }

    #[test]
    fn expand_bbox_rejects_negative_percent() {
        let original = bbox(0.0, 0.0, 1.0, 1.0);
        assert!(matches!(
            expand_bbox(&original, -5.0),
            Err(LocationError::InvalidPadding(_))
        ));
        assert_eq!(expand_bbox(&original, 0.0).unwrap(), original);
    }
}
