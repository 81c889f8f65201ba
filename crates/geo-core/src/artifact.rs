//! Outbound analysis artifact
//!
//! The camelCase document returned to callers and stored in the cache.

use chrono::NaiveDate;
use geo_plan::{AnalysisPlan, AnalysisType, BoundingBox, DataProduct, Location, TimeRange};
use geo_workflow::{Attribution, SeriesStatistics, TimeSeriesPoint, WorkflowResult};
use serde::{Deserialize, Serialize};

/// Summary statistics as exposed to callers
///
/// Time-series runs fill every field; change runs only `change_percent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
}

impl From<SeriesStatistics> for ArtifactStats {
    fn from(stats: SeriesStatistics) -> Self {
        Self {
            mean: Some(stats.mean),
            min: Some(stats.min),
            min_date: Some(stats.min_date),
            max: Some(stats.max),
            max_date: Some(stats.max_date),
            std_dev: Some(stats.std_dev),
            trend: Some(stats.trend),
            change_percent: stats.change_percent,
        }
    }
}

/// Request echo and run bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMetadata {
    pub analysis_type: AnalysisType,
    pub data_product: DataProduct,
    pub location: Location,
    pub time_range: TimeRange,
    /// Wall time of the run that produced the artifact
    pub compute_time_ms: u64,
    /// Served from the cache rather than computed
    pub cached: bool,
    /// Unit of series values and of the change scalar
    pub units: String,
}

/// Analysis result document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisArtifact {
    /// XYZ tile template of the full-range composite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_tile_url: Option<String>,
    /// Extent of the composite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_bounds: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_series: Option<Vec<TimeSeriesPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ArtifactStats>,
    pub attributions: Vec<Attribution>,
    /// Advisory guardrail notices
    #[serde(default)]
    pub warnings: Vec<String>,
    pub metadata: ArtifactMetadata,
}

impl AnalysisArtifact {
    /// Assemble from a workflow result
    #[must_use]
    pub fn from_result(
        plan: &AnalysisPlan,
        result: WorkflowResult,
        warnings: Vec<String>,
        compute_time_ms: u64,
    ) -> Self {
        let stats = match (result.statistics, result.change_percent) {
            (Some(stats), _) => Some(ArtifactStats::from(stats)),
            (None, Some(change)) => Some(ArtifactStats {
                change_percent: Some(change),
                ..ArtifactStats::default()
            }),
            (None, None) => None,
        };
        let (map_tile_url, map_bounds) = match result.map {
            Some(layer) => (Some(layer.tile_url), Some(layer.bounds)),
            None => (None, None),
        };

        Self {
            map_tile_url,
            map_bounds,
            time_series: result.time_series,
            stats,
            attributions: result.attributions,
            warnings,
            metadata: ArtifactMetadata {
                analysis_type: plan.analysis_type(),
                data_product: plan.data_product(),
                location: plan.location().clone(),
                time_range: *plan.time_range(),
                compute_time_ms,
                cached: false,
                units: result.units,
            },
        }
    }

    /// Copy flagged as served from cache
    #[inline]
    #[must_use]
    pub fn into_cached(mut self) -> Self {
        self.metadata.cached = true;
        self
    }

    /// Number of series points
    #[inline]
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.time_series.as_ref().map_or(0, Vec::len)
    }
}
