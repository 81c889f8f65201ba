//! Rainfall from CHIRPS daily estimates

use crate::dataset::{ChangeFormula, DatasetSpec, Normalization};
use crate::engine::{BandExpression, Visualization};
use crate::result::Attribution;
use crate::workflow::Workflow;
use geo_plan::{AnalysisPlan, DataProduct};

/// CHIRPS daily precipitation
pub const CHIRPS_COLLECTION: &str = "UCSB-CHG/CHIRPS/DAILY";

/// Precipitation workflow
#[derive(Debug, Clone, Copy, Default)]
pub struct PrecipitationWorkflow;

impl Workflow for PrecipitationWorkflow {
    fn product(&self) -> DataProduct {
        DataProduct::Precipitation
    }

    fn dataset(&self, _plan: &AnalysisPlan) -> DatasetSpec {
        DatasetSpec {
            collection: CHIRPS_COLLECTION.to_string(),
            band: BandExpression::band("precipitation"),
            scale: 5566.0,
            cloud_filter: None,
            normalization: Normalization::Identity,
            change_formula: ChangeFormula::RawDelta,
            units: "mm/day",
            visualization: Visualization::new(
                0.0,
                20.0,
                &["ffffcc", "a1dab4", "41b6c4", "2c7fb8", "253494"],
            ),
            attributions: vec![Attribution::new(
                "CHIRPS Daily: Climate Hazards Group InfraRed Precipitation with Station Data v2.0",
                "UCSB Climate Hazards Center",
            )
            .with_license("CC0 / Public domain")
            .with_citation(
                "Funk, C. et al. (2015). The climate hazards infrared precipitation with stations. \
                 Scientific Data 2, 150066.",
            )],
        }
    }
}
