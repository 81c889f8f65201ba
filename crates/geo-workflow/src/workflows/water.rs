//! Surface water extent
//!
//! JRC Global Surface Water yearly history by default: the collection holds
//! one image per year, so its buckets are calendar years. Sentinel-2 NDWI is
//! used when requested and bucketed monthly like other optical products.

use super::requested;
use crate::bucket::Granularity;
use crate::dataset::{ChangeFormula, DatasetSpec, Normalization};
use crate::engine::{BandExpression, CloudFilter, Visualization};
use crate::result::Attribution;
use crate::workflow::Workflow;
use geo_plan::{AnalysisPlan, DataProduct};

/// JRC yearly water history
pub const JRC_COLLECTION: &str = "JRC/GSW1_4/YearlyHistory";

const SENTINEL2_PREFIXES: &[&str] = &["COPERNICUS/S2"];

/// Water workflow
#[derive(Debug, Clone, Copy, Default)]
pub struct WaterWorkflow;

impl Workflow for WaterWorkflow {
    fn product(&self) -> DataProduct {
        DataProduct::Water
    }

    fn granularity(&self, plan: &AnalysisPlan) -> Granularity {
        match requested(plan, SENTINEL2_PREFIXES) {
            Some(_) => Granularity::Monthly,
            None => Granularity::Yearly,
        }
    }

    fn dataset(&self, plan: &AnalysisPlan) -> DatasetSpec {
        if let Some(collection) = requested(plan, SENTINEL2_PREFIXES) {
            return DatasetSpec {
                collection: collection.to_string(),
                band: BandExpression::normalized_difference("B3", "B8"),
                scale: 10.0,
                cloud_filter: Some(CloudFilter {
                    property: "CLOUDY_PIXEL_PERCENTAGE".into(),
                    max_percent: 20.0,
                }),
                normalization: Normalization::Identity,
                change_formula: ChangeFormula::ScaledDelta { factor: 100.0 },
                units: "NDWI",
                visualization: Visualization::new(-0.5, 0.5, &["a52a2a", "ffffff", "0000ff"]),
                attributions: vec![Attribution::new("Sentinel-2 MSI Level-2A", "ESA Copernicus")
                    .with_license("Copernicus Sentinel Data Terms and Conditions")],
            };
        }

        // Fraction of valid observations classified as water; already ×100
        // after normalization, so the change is reported in percentage points.
        DatasetSpec {
            collection: JRC_COLLECTION.to_string(),
            band: BandExpression::band("water_fraction"),
            scale: 30.0,
            cloud_filter: None,
            normalization: Normalization::FractionToPercent,
            change_formula: ChangeFormula::RawDelta,
            units: "% water",
            visualization: Visualization::new(0.0, 1.0, &["ffffff", "0000ff"]),
            attributions: vec![Attribution::new("JRC Global Surface Water v1.4", "EC JRC / Google")
                .with_license("CC BY 4.0")
                .with_citation(
                    "Pekel, J.-F., Cottam, A., Gorelick, N., Belward, A. S. (2016). \
                     High-resolution mapping of global surface water and its long-term changes. \
                     Nature 540, 418-422.",
                )],
        }
    }
}
