//! Remote compute engine seam
//!
//! The engine is opaque: it filters a collection by bounds and date, selects
//! or derives a band, and reduces over a region. Everything here is the
//! request/response vocabulary the executors speak to it.

use async_trait::async_trait;
use chrono::NaiveDate;
use geo_plan::{BoundingBox, Reducer};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Band selection or derivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BandExpression {
    /// Single named band
    Band {
        /// Band name in the collection
        name: String,
    },
    /// `(a - b) / (a + b)`
    NormalizedDifference {
        /// First band
        a: String,
        /// Second band
        b: String,
    },
    /// `2.5 * (nir - red) / (nir + 6 red - 7.5 blue + 1)`
    EnhancedVegetationIndex {
        /// Near-infrared band
        nir: String,
        /// Red band
        red: String,
        /// Blue band
        blue: String,
    },
}

impl BandExpression {
    /// Single named band
    #[must_use]
    pub fn band(name: impl Into<String>) -> Self {
        BandExpression::Band { name: name.into() }
    }

    /// Normalized difference of two bands
    #[must_use]
    pub fn normalized_difference(a: impl Into<String>, b: impl Into<String>) -> Self {
        BandExpression::NormalizedDifference {
            a: a.into(),
            b: b.into(),
        }
    }
}

impl Display for BandExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BandExpression::Band { name } => f.write_str(name),
            BandExpression::NormalizedDifference { a, b } => write!(f, "nd({a}, {b})"),
            BandExpression::EnhancedVegetationIndex { nir, red, blue } => {
                write!(f, "evi({nir}, {red}, {blue})")
            }
        }
    }
}

/// Half-open `[start, end_exclusive)` date filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// First included day
    pub start: NaiveDate,
    /// First excluded day
    pub end_exclusive: NaiveDate,
}

impl DateWindow {
    /// Create window
    #[inline]
    #[must_use]
    pub const fn new(start: NaiveDate, end_exclusive: NaiveDate) -> Self {
        Self {
            start,
            end_exclusive,
        }
    }

    /// Window covering `[start, end]` with `end` inclusive
    #[inline]
    #[must_use]
    pub fn inclusive(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(start, end.succ_opt().unwrap_or(end))
    }
}

impl Display for DateWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end_exclusive)
    }
}

/// Scene-level cloud cover filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudFilter {
    /// Collection property holding the scene cloud percentage
    pub property: String,
    /// Scenes above this percentage are dropped
    pub max_percent: f64,
}

/// Rendering parameters for a composite tile layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visualization {
    /// Value mapped to the first palette color
    pub min: f64,
    /// Value mapped to the last palette color
    pub max: f64,
    /// Hex colors, low to high
    pub palette: Vec<String>,
}

impl Visualization {
    /// Create from a static palette
    #[must_use]
    pub fn new(min: f64, max: f64, palette: &[&str]) -> Self {
        Self {
            min,
            max,
            palette: palette.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}

/// One scalar reduction over a region and window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReductionRequest {
    /// Remote collection id
    pub collection: String,
    /// Band to reduce
    pub band: BandExpression,
    /// Area of interest
    pub bounds: BoundingBox,
    /// Date filter
    pub window: DateWindow,
    /// Optional scene filter
    pub cloud_filter: Option<CloudFilter>,
    /// Pixel/observation aggregation
    pub reducer: Reducer,
    /// Ground sample distance in meters
    pub scale: f64,
}

/// Full-window composite for visualization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeRequest {
    /// Remote collection id
    pub collection: String,
    /// Band to render
    pub band: BandExpression,
    /// Area of interest
    pub bounds: BoundingBox,
    /// Date filter
    pub window: DateWindow,
    /// Optional scene filter
    pub cloud_filter: Option<CloudFilter>,
    /// Temporal compositing reducer
    pub reducer: Reducer,
    /// Tile rendering
    pub visualization: Visualization,
}

/// Before/after composite difference reduced to scalars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequest {
    /// Remote collection id
    pub collection: String,
    /// Band to compare
    pub band: BandExpression,
    /// Area of interest
    pub bounds: BoundingBox,
    /// Earlier half
    pub before: DateWindow,
    /// Later half
    pub after: DateWindow,
    /// Optional scene filter
    pub cloud_filter: Option<CloudFilter>,
    /// Reducer for each half's composite
    pub composite_reducer: Reducer,
    /// Reducer over the region
    pub region_reducer: Reducer,
    /// Ground sample distance in meters
    pub scale: f64,
}

/// Region-reduced values of a change request, in raw collection units
///
/// `delta` is the reduction of `after - before` per pixel, which is not
/// necessarily `after - before` of the reduced values when masks differ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeReduction {
    /// Earlier composite
    pub before: Option<f64>,
    /// Later composite
    pub after: Option<f64>,
    /// Per-pixel difference
    pub delta: Option<f64>,
}

/// Rendered composite reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLayer {
    /// XYZ tile URL template
    pub tile_url: String,
    /// Extent covered by the layer
    pub bounds: BoundingBox,
}

/// Remote compute errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteComputeError {
    /// Request rejected or failed
    #[error("remote compute request failed: {0}")]
    Request(String),

    /// Service temporarily unavailable
    #[error("remote compute service unavailable: {0}")]
    Unavailable(String),

    /// Response could not be interpreted
    #[error("invalid remote compute response: {0}")]
    InvalidResponse(String),
}

impl RemoteComputeError {
    /// Check if a later attempt may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, RemoteComputeError::Unavailable(_))
    }
}

/// Remote geospatial compute service
///
/// Every call may take seconds; implementations must be safe to call
/// concurrently.
#[async_trait]
pub trait ComputeEngine: Send + Sync {
    /// Reduce a filtered collection to one scalar
    ///
    /// `Ok(None)` means the engine found no observations (no coverage).
    async fn reduce_region(&self, request: &ReductionRequest)
        -> Result<Option<f64>, RemoteComputeError>;

    /// Build a composite tile layer
    async fn composite(&self, request: &CompositeRequest) -> Result<MapLayer, RemoteComputeError>;

    /// Reduce the before/after difference of two composites
    async fn reduce_change(&self, request: &ChangeRequest)
        -> Result<ChangeReduction, RemoteComputeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn inclusive_window_is_half_open() {
        let window = DateWindow::inclusive(date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(window.end_exclusive, date(2024, 2, 1));
        assert_eq!(window.to_string(), "[2024-01-01, 2024-02-01)");
    }

    #[test]
    fn band_expression_display_and_serde() {
        let nd = BandExpression::normalized_difference("B8", "B4");
        assert_eq!(nd.to_string(), "nd(B8, B4)");

        let json = serde_json::to_value(&nd).unwrap();
        assert_eq!(json["kind"], "normalized_difference");
        assert_eq!(BandExpression::band("NDVI").to_string(), "NDVI");
    }

    #[test]
    fn only_unavailable_is_retryable() {
        assert!(RemoteComputeError::Unavailable("busy".into()).is_retryable());
        assert!(!RemoteComputeError::Request("bad".into()).is_retryable());
    }
}
