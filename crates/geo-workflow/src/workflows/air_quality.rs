//! Atmospheric trace gases from Sentinel-5P TROPOMI
//!
//! Column densities arrive in mol/m² and are reported in µmol/m². The
//! change scalar is relative to the earlier half: `delta / before × 100`.

use super::requested;
use crate::dataset::{ChangeFormula, DatasetSpec, Normalization};
use crate::engine::{BandExpression, Visualization};
use crate::result::Attribution;
use crate::workflow::Workflow;
use geo_plan::{AnalysisPlan, DataProduct};

/// Tropospheric NO₂, offline L3
pub const NO2_COLLECTION: &str = "COPERNICUS/S5P/OFFL/L3_NO2";
/// Carbon monoxide, offline L3
pub const CO_COLLECTION: &str = "COPERNICUS/S5P/OFFL/L3_CO";

const PLUME: &[&str] = &["black", "blue", "purple", "cyan", "green", "yellow", "red"];

/// Air quality workflow
#[derive(Debug, Clone, Copy, Default)]
pub struct AirQualityWorkflow;

impl Workflow for AirQualityWorkflow {
    fn product(&self) -> DataProduct {
        DataProduct::AirQuality
    }

    fn dataset(&self, plan: &AnalysisPlan) -> DatasetSpec {
        let (collection, band, gas) = match requested(plan, &[CO_COLLECTION]) {
            Some(_) => (CO_COLLECTION, "CO_column_number_density", "CO"),
            None => (NO2_COLLECTION, "tropospheric_NO2_column_number_density", "NO2"),
        };

        DatasetSpec {
            collection: collection.to_string(),
            band: BandExpression::band(band),
            scale: 1113.2,
            cloud_filter: None,
            normalization: Normalization::MolToMicromol,
            change_formula: ChangeFormula::RelativeToBaseline,
            units: "µmol/m²",
            visualization: Visualization::new(0.0, 0.0002, PLUME),
            attributions: vec![Attribution::new(
                format!("Sentinel-5P TROPOMI {gas} OFFL L3"),
                "ESA Copernicus",
            )
            .with_license("Copernicus Sentinel Data Terms and Conditions")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::test_support::plan;
    use serde_json::json;

    #[test]
    fn no2_by_default_co_on_request() {
        let no2 = AirQualityWorkflow.dataset(&plan("air_quality", &["x"], json!(null)));
        assert_eq!(no2.collection, NO2_COLLECTION);
        assert_eq!(no2.change_formula, ChangeFormula::RelativeToBaseline);

        let co = AirQualityWorkflow.dataset(&plan("air_quality", &[CO_COLLECTION], json!(null)));
        assert_eq!(co.band, BandExpression::band("CO_column_number_density"));
        assert!(co.attributions[0].dataset.contains("CO"));
    }
}
