//! Guardrail policy configuration
//!
//! Process-wide business limits. Deserializable from configuration files;
//! missing keys fall back to the defaults below.

use chrono::NaiveDate;
use geo_plan::{AnalysisType, DataProduct};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Policy limits enforced before any remote work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardrailPolicy {
    /// Longest permitted time range, in average-length years
    pub max_time_range_years: f64,
    /// Largest permitted bounding box edge, in degrees
    pub max_aoi_degrees: f64,
    /// Analysis types callers may request
    pub allowed_analysis_types: BTreeSet<AnalysisType>,
    /// Data products callers may request
    pub allowed_data_products: BTreeSet<DataProduct>,
    /// Earliest practical date with data, per product (advisory only)
    pub data_availability_floors: BTreeMap<DataProduct, NaiveDate>,
}

impl GuardrailPolicy {
    /// Create default policy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With maximum time range
    #[inline]
    #[must_use]
    pub fn with_max_years(mut self, years: f64) -> Self {
        self.max_time_range_years = years;
        self
    }

    /// With maximum AOI edge length
    #[inline]
    #[must_use]
    pub fn with_max_aoi_degrees(mut self, degrees: f64) -> Self {
        self.max_aoi_degrees = degrees;
        self
    }

    /// With an explicit analysis-type allow-list
    #[must_use]
    pub fn with_analysis_types(mut self, types: impl IntoIterator<Item = AnalysisType>) -> Self {
        self.allowed_analysis_types = types.into_iter().collect();
        self
    }

    /// With an explicit data-product allow-list
    #[must_use]
    pub fn with_data_products(mut self, products: impl IntoIterator<Item = DataProduct>) -> Self {
        self.allowed_data_products = products.into_iter().collect();
        self
    }

    /// Availability floor for a product, if configured
    #[inline]
    #[must_use]
    pub fn availability_floor(&self, product: DataProduct) -> Option<NaiveDate> {
        self.data_availability_floors.get(&product).copied()
    }
}

impl Default for GuardrailPolicy {
    fn default() -> Self {
        Self {
            max_time_range_years: 10.0,
            max_aoi_degrees: 5.0,
            allowed_analysis_types: [
                AnalysisType::Timeseries,
                AnalysisType::Change,
                AnalysisType::SingleDateMap,
                AnalysisType::ZonalStatistics,
            ]
            .into_iter()
            .collect(),
            allowed_data_products: DataProduct::ALL.iter().copied().collect(),
            data_availability_floors: default_floors(),
        }
    }
}

fn default_floors() -> BTreeMap<DataProduct, NaiveDate> {
    [
        (DataProduct::Vegetation, (2000, 2, 18)),
        (DataProduct::Water, (1984, 3, 16)),
        (DataProduct::Temperature, (2000, 2, 24)),
        (DataProduct::Precipitation, (1981, 1, 1)),
        (DataProduct::AirQuality, (2018, 6, 28)),
        (DataProduct::Nightlights, (2012, 4, 1)),
        (DataProduct::LandCover, (2015, 1, 1)),
        (DataProduct::Fire, (2000, 11, 1)),
    ]
    .into_iter()
    .filter_map(|(product, (y, m, d))| NaiveDate::from_ymd_opt(y, m, d).map(|date| (product, date)))
    .collect()
}
