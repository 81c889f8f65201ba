//! Workflow output types

use crate::engine::MapLayer;
use crate::statistics::SeriesStatistics;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One point of an ordered series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Representative date of the bucket
    pub date: NaiveDate,
    /// Normalized value
    pub value: f64,
    /// Bucket label (`YYYY-MM` / `YYYY`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl TimeSeriesPoint {
    /// Create an unlabeled point
    #[inline]
    #[must_use]
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value,
            label: None,
        }
    }

    /// With label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Dataset credit attached to every result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    /// Dataset name
    pub dataset: String,
    /// Producing organization
    pub source: String,
    /// Usage license
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Preferred citation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
}

impl Attribution {
    /// Create attribution
    #[must_use]
    pub fn new(dataset: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            source: source.into(),
            license: None,
            citation: None,
        }
    }

    /// With license
    #[inline]
    #[must_use]
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    /// With citation
    #[inline]
    #[must_use]
    pub fn with_citation(mut self, citation: impl Into<String>) -> Self {
        self.citation = Some(citation.into());
        self
    }
}

/// Executor output
///
/// `attributions` is never empty: the workflow supplies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResult {
    /// Full-range composite
    pub map: Option<MapLayer>,
    /// Chronological series (time-series mode)
    pub time_series: Option<Vec<TimeSeriesPoint>>,
    /// Summary of the series
    pub statistics: Option<SeriesStatistics>,
    /// Change scalar (change mode)
    pub change_percent: Option<f64>,
    /// Unit of series values and of the change scalar
    pub units: String,
    /// Dataset credits
    pub attributions: Vec<Attribution>,
}

impl WorkflowResult {
    /// Result carrying only a composite
    #[must_use]
    pub fn composite(
        map: MapLayer,
        units: impl Into<String>,
        attributions: Vec<Attribution>,
    ) -> Self {
        Self {
            map: Some(map),
            time_series: None,
            statistics: None,
            change_percent: None,
            units: units.into(),
            attributions,
        }
    }

    /// Number of series points (0 when no series)
    #[inline]
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.time_series.as_ref().map_or(0, Vec::len)
    }
}
