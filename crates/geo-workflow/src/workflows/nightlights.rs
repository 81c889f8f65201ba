//! Night-time radiance from VIIRS DNB monthly composites

use crate::dataset::{ChangeFormula, DatasetSpec, Normalization};
use crate::engine::{BandExpression, Visualization};
use crate::result::Attribution;
use crate::workflow::Workflow;
use geo_plan::{AnalysisPlan, DataProduct};

/// VIIRS stray-light corrected monthly composites
pub const VIIRS_COLLECTION: &str = "NOAA/VIIRS/DNB/MONTHLY_V1/VCMSLCFG";

/// Nightlights workflow
#[derive(Debug, Clone, Copy, Default)]
pub struct NightlightsWorkflow;

impl Workflow for NightlightsWorkflow {
    fn product(&self) -> DataProduct {
        DataProduct::Nightlights
    }

    fn dataset(&self, _plan: &AnalysisPlan) -> DatasetSpec {
        DatasetSpec {
            collection: VIIRS_COLLECTION.to_string(),
            band: BandExpression::band("avg_rad"),
            scale: 463.83,
            cloud_filter: None,
            normalization: Normalization::Identity,
            change_formula: ChangeFormula::RawDelta,
            units: "nW/cm²/sr",
            visualization: Visualization::new(0.0, 60.0, &["000000", "ffff00", "ffffff"]),
            attributions: vec![Attribution::new(
                "VIIRS Nighttime Day/Night Band Composites V1",
                "Earth Observation Group, Payne Institute",
            )
            .with_license("CC BY 4.0")
            .with_citation(
                "Elvidge, C. D. et al. (2017). VIIRS night-time lights. \
                 International Journal of Remote Sensing 38, 5860-5879.",
            )],
        }
    }
}
