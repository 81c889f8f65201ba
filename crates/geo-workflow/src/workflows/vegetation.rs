//! Vegetation indices
//!
//! MODIS 16-day composites by default; Sentinel-2 surface reflectance when
//! the plan asks for it. MODIS stores indices as integers scaled by 10⁴.

use super::requested;
use crate::dataset::{ChangeFormula, DatasetSpec, Normalization};
use crate::engine::{BandExpression, CloudFilter, Visualization};
use crate::result::Attribution;
use crate::workflow::Workflow;
use geo_plan::{AnalysisPlan, DataProduct, IndexKind};

/// MODIS Terra vegetation indices, 250 m
pub const MODIS_VI_COLLECTION: &str = "MODIS/061/MOD13Q1";
/// Sentinel-2 harmonized surface reflectance
pub const SENTINEL2_COLLECTION: &str = "COPERNICUS/S2_SR_HARMONIZED";

const MODIS_SCALE_FACTOR: f64 = 0.0001;
const GREENS: &[&str] = &[
    "ffffff", "ce7e45", "df923d", "f1b555", "fcd163", "99b718", "74a901", "66a000", "529400",
    "3e8601", "207401", "056201", "004c00", "023b01", "012e01", "011d01", "011301",
];

/// Vegetation workflow
#[derive(Debug, Clone, Copy, Default)]
pub struct VegetationWorkflow;

impl VegetationWorkflow {
    fn modis(index: IndexKind) -> DatasetSpec {
        // MOD13Q1 carries NDVI and EVI only
        let (band, units) = match index {
            IndexKind::Evi => ("EVI", "EVI"),
            IndexKind::Ndvi | IndexKind::Ndwi => ("NDVI", "NDVI"),
        };
        DatasetSpec {
            collection: MODIS_VI_COLLECTION.to_string(),
            band: BandExpression::band(band),
            scale: 250.0,
            cloud_filter: None,
            normalization: Normalization::Scale {
                factor: MODIS_SCALE_FACTOR,
            },
            change_formula: ChangeFormula::ScaledDelta { factor: 100.0 },
            units,
            visualization: Visualization::new(0.0, 9000.0, GREENS),
            attributions: vec![Attribution::new(
                "MOD13Q1.061 Terra Vegetation Indices 16-Day Global 250m",
                "NASA LP DAAC",
            )
            .with_license("Public domain")
            .with_citation(
                "Didan, K. (2021). MODIS/Terra Vegetation Indices 16-Day L3 Global 250m \
                 SIN Grid V061. NASA EOSDIS Land Processes DAAC.",
            )],
        }
    }

    fn sentinel2(collection: &str, index: IndexKind) -> DatasetSpec {
        let (band, units) = match index {
            IndexKind::Ndvi => (BandExpression::normalized_difference("B8", "B4"), "NDVI"),
            IndexKind::Ndwi => (BandExpression::normalized_difference("B3", "B8"), "NDWI"),
            IndexKind::Evi => (
                BandExpression::EnhancedVegetationIndex {
                    nir: "B8".into(),
                    red: "B4".into(),
                    blue: "B2".into(),
                },
                "EVI",
            ),
        };
        DatasetSpec {
            collection: collection.to_string(),
            band,
            scale: 10.0,
            cloud_filter: Some(CloudFilter {
                property: "CLOUDY_PIXEL_PERCENTAGE".into(),
                max_percent: 20.0,
            }),
            normalization: Normalization::Identity,
            change_formula: ChangeFormula::ScaledDelta { factor: 100.0 },
            units,
            visualization: Visualization::new(0.0, 0.9, GREENS),
            attributions: vec![Attribution::new("Sentinel-2 MSI Level-2A", "ESA Copernicus")
                .with_license("Copernicus Sentinel Data Terms and Conditions")],
        }
    }
}

impl Workflow for VegetationWorkflow {
    fn product(&self) -> DataProduct {
        DataProduct::Vegetation
    }

    fn dataset(&self, plan: &AnalysisPlan) -> DatasetSpec {
        let index = plan.parameters().index.unwrap_or(IndexKind::Ndvi);
        match requested(plan, &["COPERNICUS/S2"]) {
            Some(collection) => Self::sentinel2(collection, index),
            None => Self::modis(index),
        }
    }
}
