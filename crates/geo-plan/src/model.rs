//! Analysis plan data model
//!
//! Defines the validated request types:
//! - Closed vocabularies (analysis type, data product, outputs, parameters)
//! - Time ranges with the `start < end` invariant
//! - Locations (place names or bounding boxes)
//! - The immutable [`AnalysisPlan`] itself

use crate::bbox::BoundingBox;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Error for a string outside a closed vocabulary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'; expected one of: {expected}")]
pub struct UnknownVariant {
    /// Vocabulary name
    pub kind: &'static str,
    /// Rejected input
    pub value: String,
    /// Comma-separated accepted values
    pub expected: String,
}

/// Declares a closed, snake_case string vocabulary with strict parsing
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every member of the vocabulary, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical wire name
            #[inline]
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Comma-separated list of every wire name
            #[must_use]
            pub fn expected() -> String {
                Self::ALL
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                        expected: Self::expected(),
                    }),
                }
            }
        }
    };
}

vocabulary! {
    /// Kind of analysis requested
    AnalysisType, "analysis type" {
        /// Ordered series of bucketed reductions
        Timeseries => "timeseries",
        /// Before/after delta over two halves of the range
        Change => "change",
        /// Deviation from a baseline series
        Anomaly => "anomaly",
        /// Seasonal decomposition of a series
        SeasonalTrend => "seasonal_trend",
        /// Single composite map, no series
        SingleDateMap => "single_date_map",
        /// Region statistics over the full range
        ZonalStatistics => "zonal_statistics",
    }
}

vocabulary! {
    /// Phenomenon category; selects the workflow
    DataProduct, "data product" {
        /// Vegetation indices (NDVI/EVI)
        Vegetation => "vegetation",
        /// Surface water occurrence
        Water => "water",
        /// Land surface temperature
        Temperature => "temperature",
        /// Precipitation totals
        Precipitation => "precipitation",
        /// Tropospheric trace gases
        AirQuality => "air_quality",
        /// Night-time light radiance
        Nightlights => "nightlights",
        /// Land cover classification
        LandCover => "land_cover",
        /// Burned area / active fire
        Fire => "fire",
    }
}

vocabulary! {
    /// Artifact kinds a caller may request
    OutputKind, "output" {
        /// Map tile layer
        Map => "map",
        /// Ordered time series
        Timeseries => "timeseries",
        /// Descriptive statistics
        Statistics => "statistics",
        /// Natural-language summary
        Summary => "summary",
    }
}

vocabulary! {
    /// Spectral index to compute
    IndexKind, "index" {
        /// Normalized difference vegetation index
        Ndvi => "ndvi",
        /// Enhanced vegetation index
        Evi => "evi",
        /// Normalized difference water index
        Ndwi => "ndwi",
    }
}

vocabulary! {
    /// Aggregation applied over pixels or observations
    Reducer, "reducer" {
        /// Arithmetic mean
        Mean => "mean",
        /// Median
        Median => "median",
        /// Sum
        Sum => "sum",
        /// Minimum
        Min => "min",
        /// Maximum
        Max => "max",
    }
}

/// Calendar date window, day granularity, end inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TimeRange {
    /// Create a time range
    ///
    /// # Errors
    /// Returns [`TimeRangeError`] unless `start < end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TimeRangeError> {
        if start >= end {
            return Err(TimeRangeError { start, end });
        }
        Ok(Self { start, end })
    }

    /// First day
    #[inline]
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day (inclusive)
    #[inline]
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Calendar-day difference `end - start`
    #[inline]
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Span in average-length years (365.25 days)
    #[inline]
    #[must_use]
    pub fn span_years(&self) -> f64 {
        self.days() as f64 / DAYS_PER_YEAR
    }

    /// Midpoint of the inclusive day span, rounded down
    ///
    /// Always after `start`, so `[start, midpoint)` holds at least one day.
    #[inline]
    #[must_use]
    pub fn midpoint(&self) -> NaiveDate {
        self.start + chrono::Duration::days((self.days() + 1) / 2)
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Average year length used for span computations
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Time range invariant violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("start ({start}) must be before end ({end})")]
pub struct TimeRangeError {
    /// Requested start
    pub start: NaiveDate,
    /// Requested end
    pub end: NaiveDate,
}

/// Area of interest: a place name or an explicit bounding box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    /// Place name resolved by the location resolver
    Named(String),
    /// Explicit `[west, south, east, north]` box
    BBox(BoundingBox),
}

impl Location {
    /// Bounding box if explicit
    #[inline]
    #[must_use]
    pub fn as_bbox(&self) -> Option<&BoundingBox> {
        match self {
            Location::BBox(bbox) => Some(bbox),
            Location::Named(_) => None,
        }
    }

    /// Place name if named
    #[inline]
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Location::Named(name) => Some(name),
            Location::BBox(_) => None,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Location::Named(name) => f.write_str(name),
            Location::BBox(bbox) => Display::fmt(bbox, f),
        }
    }
}

/// Optional tuning knobs; absent fields mean "workflow default"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnalysisParameters {
    /// Spectral index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexKind>,
    /// Raw band name override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band: Option<String>,
    /// Reducer override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reducer: Option<Reducer>,
    /// Ground sample distance in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Maximum scene cloud cover, percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cloud_percent: Option<f64>,
}

impl AnalysisParameters {
    /// Wire names of every knob, as (de)serialized
    pub const KEYS: &'static [&'static str] =
        &["index", "band", "reducer", "scale", "maxCloudPercent"];

    /// Whether every knob is unset
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A validated analysis request
///
/// Only produced by [`PlanValidator`](crate::PlanValidator); immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPlan {
    analysis_type: AnalysisType,
    data_product: DataProduct,
    dataset_ids: Vec<String>,
    time_range: TimeRange,
    location: Location,
    outputs: BTreeSet<OutputKind>,
    #[serde(skip_serializing_if = "AnalysisParameters::is_empty")]
    parameters: AnalysisParameters,
}

impl AnalysisPlan {
    pub(crate) fn from_parts(
        analysis_type: AnalysisType,
        data_product: DataProduct,
        dataset_ids: Vec<String>,
        time_range: TimeRange,
        location: Location,
        outputs: BTreeSet<OutputKind>,
        parameters: AnalysisParameters,
    ) -> Self {
        Self {
            analysis_type,
            data_product,
            dataset_ids,
            time_range,
            location,
            outputs,
            parameters,
        }
    }

    /// Parse and validate a JSON document
    ///
    /// # Errors
    /// Returns [`ValidationErrors`](crate::ValidationErrors) for malformed
    /// JSON or any structural violation.
    pub fn from_json_str(input: &str) -> Result<Self, crate::ValidationErrors> {
        let raw: serde_json::Value = serde_json::from_str(input).map_err(|e| {
            crate::ValidationErrors::single("$", format!("malformed JSON: {e}"))
        })?;
        crate::PlanValidator::validate(&raw)
    }

    /// Requested analysis
    #[inline]
    #[must_use]
    pub fn analysis_type(&self) -> AnalysisType {
        self.analysis_type
    }

    /// Phenomenon category
    #[inline]
    #[must_use]
    pub fn data_product(&self) -> DataProduct {
        self.data_product
    }

    /// Dataset identifiers in insertion order
    #[inline]
    #[must_use]
    pub fn dataset_ids(&self) -> &[String] {
        &self.dataset_ids
    }

    /// Requested time window
    #[inline]
    #[must_use]
    pub fn time_range(&self) -> &TimeRange {
        &self.time_range
    }

    /// Area of interest
    #[inline]
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Requested artifacts
    #[inline]
    #[must_use]
    pub fn outputs(&self) -> &BTreeSet<OutputKind> {
        &self.outputs
    }

    /// Whether an artifact kind was requested
    #[inline]
    #[must_use]
    pub fn wants(&self, output: OutputKind) -> bool {
        self.outputs.contains(&output)
    }

    /// Tuning knobs
    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &AnalysisParameters {
        &self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn vocabulary_parses_strictly() {
        assert_eq!("change".parse::<AnalysisType>().unwrap(), AnalysisType::Change);
        assert_eq!(
            "air_quality".parse::<DataProduct>().unwrap(),
            DataProduct::AirQuality
        );

        let err = "Change".parse::<AnalysisType>().unwrap_err();
        assert_eq!(err.kind, "analysis type");
        assert!(err.to_string().contains("timeseries, change, anomaly"));

        assert!("airquality".parse::<DataProduct>().is_err());
        assert!(" map".parse::<OutputKind>().is_err());
    }

    #[test]
    fn vocabulary_serde_matches_wire_names() {
        let json = serde_json::to_string(&AnalysisType::SingleDateMap).unwrap();
        assert_eq!(json, "\"single_date_map\"");
        for product in DataProduct::ALL {
            let text = serde_json::to_string(product).unwrap();
            assert_eq!(text, format!("\"{}\"", product.as_str()));
        }
    }

    #[test]
    fn time_range_invariant() {
        assert!(TimeRange::new(date("2024-01-02"), date("2024-01-01")).is_err());
        assert!(TimeRange::new(date("2024-01-01"), date("2024-01-01")).is_err());

        let range = TimeRange::new(date("2024-01-01"), date("2024-12-31")).unwrap();
        assert_eq!(range.days(), 365);
        assert_eq!(range.to_string(), "2024-01-01 to 2024-12-31");
    }

    #[test]
    fn time_range_midpoint_is_elapsed_time() {
        let range = TimeRange::new(date("2020-01-01"), date("2020-03-01")).unwrap();
        // 60 days (leap February) -> day 30
        assert_eq!(range.midpoint(), date("2020-01-31"));
    }

    #[test]
    fn time_range_midpoint_counts_inclusive_end() {
        let one_day = TimeRange::new(date("2024-01-01"), date("2024-01-02")).unwrap();
        assert_eq!(one_day.midpoint(), date("2024-01-02"));

        let two_days = TimeRange::new(date("2024-01-01"), date("2024-01-03")).unwrap();
        assert_eq!(two_days.midpoint(), date("2024-01-02"));
    }

    #[test]
    fn parameter_keys_match_wire_names() {
        let full = AnalysisParameters {
            index: Some(IndexKind::Evi),
            band: Some("B4".into()),
            reducer: Some(Reducer::Max),
            scale: Some(30.0),
            max_cloud_percent: Some(10.0),
        };
        let value = serde_json::to_value(&full).unwrap();
        let mut wire: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        let mut keys = AnalysisParameters::KEYS.to_vec();
        wire.sort_unstable();
        keys.sort_unstable();
        assert_eq!(wire, keys);

        let back: AnalysisParameters = serde_json::from_value(value).unwrap();
        assert_eq!(back, full);
        assert!(serde_json::from_str::<AnalysisParameters>(r#"{"gamma": 1}"#).is_err());
    }

    #[test]
    fn location_serde_untagged() {
        let named: Location = serde_json::from_str("\"Nile Delta\"").unwrap();
        assert_eq!(named.as_name(), Some("Nile Delta"));

        let boxed: Location = serde_json::from_str("[30.0, 30.0, 32.0, 31.5]").unwrap();
        assert_eq!(boxed.as_bbox().map(|b| b.width()), Some(2.0));
        assert_eq!(boxed.to_string(), "[30, 30, 32, 31.5]");
    }

    #[test]
    fn parameters_empty_detection() {
        assert!(AnalysisParameters::default().is_empty());
        let params = AnalysisParameters {
            reducer: Some(Reducer::Median),
            ..Default::default()
        };
        assert!(!params.is_empty());
    }
}
