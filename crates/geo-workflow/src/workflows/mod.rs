//! Built-in phenomenon workflows

mod air_quality;
mod nightlights;
mod precipitation;
mod temperature;
mod vegetation;
mod water;

pub use air_quality::{AirQualityWorkflow, CO_COLLECTION, NO2_COLLECTION};
pub use nightlights::{NightlightsWorkflow, VIIRS_COLLECTION};
pub use precipitation::{PrecipitationWorkflow, CHIRPS_COLLECTION};
pub use temperature::{TemperatureWorkflow, ERA5_COLLECTION, MODIS_LST_COLLECTION};
pub use vegetation::{VegetationWorkflow, MODIS_VI_COLLECTION, SENTINEL2_COLLECTION};
pub use water::{WaterWorkflow, JRC_COLLECTION};

use geo_plan::AnalysisPlan;

/// First requested dataset id starting with any of `prefixes`
fn requested<'a>(plan: &'a AnalysisPlan, prefixes: &[&str]) -> Option<&'a str> {
    plan.dataset_ids()
        .iter()
        .map(String::as_str)
        .find(|id| prefixes.iter().any(|prefix| id.starts_with(prefix)))
}

#[cfg(test)]
mod test_support {
    use geo_plan::{AnalysisPlan, PlanValidator};
    use serde_json::{json, Value};

    pub(crate) fn plan(product: &str, ids: &[&str], parameters: Value) -> AnalysisPlan {
        PlanValidator::validate(&json!({
            "analysisType": "timeseries",
            "dataProduct": product,
            "datasetIds": ids,
            "timeRange": { "start": "2023-01-01", "end": "2023-12-31" },
            "location": "Nairobi",
            "outputs": ["timeseries"],
            "parameters": parameters
        }))
        .unwrap()
    }
}
