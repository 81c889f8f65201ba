//! Land surface and air temperature
//!
//! Reported in °C. MODIS LST is Kelvin scaled by 0.02; ERA5-Land is plain
//! Kelvin.

use super::requested;
use crate::dataset::{ChangeFormula, DatasetSpec, Normalization};
use crate::engine::{BandExpression, Visualization};
use crate::result::Attribution;
use crate::workflow::Workflow;
use geo_plan::{AnalysisPlan, DataProduct};

/// MODIS Terra 8-day land surface temperature
pub const MODIS_LST_COLLECTION: &str = "MODIS/061/MOD11A2";
/// ERA5-Land monthly aggregates
pub const ERA5_COLLECTION: &str = "ECMWF/ERA5_LAND/MONTHLY_AGGR";

const HEAT: &[&str] = &[
    "040274", "0502a3", "0602ff", "307ef3", "30c8e2", "3be285", "86e26f", "d6e21f", "ffd611",
    "ff8b13", "ff0000", "c21301", "911003",
];

/// Temperature workflow
#[derive(Debug, Clone, Copy, Default)]
pub struct TemperatureWorkflow;

impl Workflow for TemperatureWorkflow {
    fn product(&self) -> DataProduct {
        DataProduct::Temperature
    }

    fn dataset(&self, plan: &AnalysisPlan) -> DatasetSpec {
        if let Some(collection) = requested(plan, &["ECMWF/ERA5"]) {
            return DatasetSpec {
                collection: collection.to_string(),
                band: BandExpression::band("temperature_2m"),
                scale: 11132.0,
                cloud_filter: None,
                normalization: Normalization::KelvinToCelsius { factor: 1.0 },
                change_formula: ChangeFormula::RawDelta,
                units: "°C",
                visualization: Visualization::new(250.0, 320.0, HEAT),
                attributions: vec![Attribution::new(
                    "ERA5-Land Monthly Aggregated",
                    "ECMWF / Copernicus Climate Change Service",
                )
                .with_license("Copernicus License")
                .with_citation(
                    "Muñoz Sabater, J. (2019). ERA5-Land monthly averaged data \
                     from 1981 to present. C3S CDS.",
                )],
            };
        }

        DatasetSpec {
            collection: MODIS_LST_COLLECTION.to_string(),
            band: BandExpression::band("LST_Day_1km"),
            scale: 1000.0,
            cloud_filter: None,
            normalization: Normalization::KelvinToCelsius { factor: 0.02 },
            change_formula: ChangeFormula::RawDelta,
            units: "°C",
            visualization: Visualization::new(13000.0, 16500.0, HEAT),
            attributions: vec![Attribution::new(
                "MOD11A2.061 Terra Land Surface Temperature 8-Day Global 1km",
                "NASA LP DAAC",
            )
            .with_license("Public domain")
            .with_citation(
                "Wan, Z., Hook, S., Hulley, G. (2021). MODIS/Terra Land Surface \
                 Temperature/Emissivity 8-Day L3 Global 1km SIN Grid V061.",
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::test_support::plan;
    use serde_json::json;

    #[test]
    fn modis_lst_converts_to_celsius() {
        let spec =
            TemperatureWorkflow.dataset(&plan("temperature", &["MODIS/061/MOD11A2"], json!(null)));
        assert!((spec.normalization.apply(14657.5) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn era5_is_plain_kelvin() {
        let spec = TemperatureWorkflow.dataset(&plan(
            "temperature",
            &["ECMWF/ERA5_LAND/MONTHLY_AGGR"],
            json!(null),
        ));
        assert_eq!(spec.collection, ERA5_COLLECTION);
        assert!((spec.normalization.apply(273.15)).abs() < 1e-9);
    }
}
