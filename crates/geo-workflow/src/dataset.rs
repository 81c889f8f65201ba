//! Per-dataset execution parameters
//!
//! A [`DatasetSpec`] is what a workflow hands the shared executors: which
//! collection and band to reduce, at what scale, how to convert raw values
//! into reporting units, and how to turn a before/after reduction into the
//! change scalar.

use crate::engine::{BandExpression, ChangeReduction, CloudFilter, Visualization};
use crate::result::Attribution;
use geo_plan::{AnalysisParameters, Reducer};
use serde::{Deserialize, Serialize};

/// Raw collection value → reporting unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Normalization {
    /// Values already in reporting units
    Identity,
    /// Multiply by a product scale factor
    Scale {
        /// Multiplier
        factor: f64,
    },
    /// Fraction in `[0, 1]` → percent
    FractionToPercent,
    /// Scaled Kelvin → degrees Celsius
    KelvinToCelsius {
        /// Multiplier applied before the offset
        factor: f64,
    },
    /// mol/m² → µmol/m²
    MolToMicromol,
}

/// Offset between Kelvin and Celsius
const KELVIN_OFFSET: f64 = 273.15;

impl Normalization {
    /// Convert an absolute value
    #[must_use]
    pub fn apply(&self, raw: f64) -> f64 {
        match *self {
            Normalization::Identity => raw,
            Normalization::Scale { factor } => raw * factor,
            Normalization::FractionToPercent => raw * 100.0,
            Normalization::KelvinToCelsius { factor } => raw * factor - KELVIN_OFFSET,
            Normalization::MolToMicromol => raw * 1e6,
        }
    }

    /// Convert a difference of two values (offsets cancel)
    #[must_use]
    pub fn apply_delta(&self, raw_delta: f64) -> f64 {
        match *self {
            Normalization::KelvinToCelsius { factor } => raw_delta * factor,
            other => other.apply(raw_delta),
        }
    }
}

/// How a change reduction becomes the reported change scalar
///
/// Applied to normalized values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeFormula {
    /// `delta * factor`, e.g. a unitless index difference ×100
    ScaledDelta {
        /// Multiplier
        factor: f64,
    },
    /// `delta` in reporting units
    RawDelta,
    /// `delta / before * 100`; undefined when the baseline is zero
    RelativeToBaseline,
}

impl ChangeFormula {
    /// Compute the change scalar
    ///
    /// Returns `None` when a required input is missing, non-finite, or the
    /// baseline is zero.
    #[must_use]
    pub fn apply(&self, reduction: &ChangeReduction, normalization: Normalization) -> Option<f64> {
        let delta = finite(reduction.delta).map(|d| normalization.apply_delta(d))?;

        let value = match *self {
            ChangeFormula::ScaledDelta { factor } => delta * factor,
            ChangeFormula::RawDelta => delta,
            ChangeFormula::RelativeToBaseline => {
                let before = finite(reduction.before).map(|b| normalization.apply(b))?;
                if before == 0.0 {
                    return None;
                }
                delta / before * 100.0
            }
        };
        value.is_finite().then_some(value)
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Everything the executors need to run one dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSpec {
    /// Remote collection id
    pub collection: String,
    /// Band to reduce
    pub band: BandExpression,
    /// Default ground sample distance in meters
    pub scale: f64,
    /// Scene cloud property and default threshold
    pub cloud_filter: Option<CloudFilter>,
    /// Raw value conversion
    pub normalization: Normalization,
    /// Change scalar definition
    pub change_formula: ChangeFormula,
    /// Reporting unit
    pub units: &'static str,
    /// Composite rendering
    pub visualization: Visualization,
    /// Dataset credits
    pub attributions: Vec<Attribution>,
}

impl DatasetSpec {
    /// Apply plan overrides
    ///
    /// `band` replaces the band expression, `scale` the default scale and
    /// `maxCloudPercent` the threshold of an existing cloud filter.
    #[must_use]
    pub fn with_parameters(mut self, parameters: &AnalysisParameters) -> Self {
        if let Some(band) = &parameters.band {
            self.band = BandExpression::band(band.clone());
        }
        if let Some(scale) = parameters.scale {
            self.scale = scale;
        }
        if let (Some(filter), Some(max)) =
            (self.cloud_filter.as_mut(), parameters.max_cloud_percent)
        {
            filter.max_percent = max;
        }
        self
    }

    /// Region reducer for bucket reductions
    #[inline]
    #[must_use]
    pub fn region_reducer(parameters: &AnalysisParameters) -> Reducer {
        parameters.reducer.unwrap_or(Reducer::Mean)
    }

    /// Temporal reducer for composites
    #[inline]
    #[must_use]
    pub fn composite_reducer(parameters: &AnalysisParameters) -> Reducer {
        parameters.reducer.unwrap_or(Reducer::Median)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reduction(before: Option<f64>, after: Option<f64>, delta: Option<f64>) -> ChangeReduction {
        ChangeReduction {
            before,
            after,
            delta,
        }
    }

    #[test]
    fn normalization_units() {
        assert!((Normalization::Scale { factor: 0.0001 }.apply(7500.0) - 0.75).abs() < 1e-12);
        assert_eq!(Normalization::FractionToPercent.apply(0.25), 25.0);
        // MODIS LST: 15000 * 0.02 = 300 K
        let lst = Normalization::KelvinToCelsius { factor: 0.02 };
        assert!((lst.apply(15000.0) - 26.85).abs() < 1e-9);
        assert!((lst.apply_delta(50.0) - 1.0).abs() < 1e-12);
        assert!((Normalization::MolToMicromol.apply(0.00005) - 50.0).abs() < 1e-9);
        assert_eq!(Normalization::Identity.apply(3.5), 3.5);
    }

    #[test]
    fn scaled_delta() {
        let formula = ChangeFormula::ScaledDelta { factor: 100.0 };
        let value = formula
            .apply(&reduction(Some(0.5), Some(0.6), Some(0.1)), Normalization::Identity)
            .unwrap();
        assert!((value - 10.0).abs() < 1e-9);
    }

    #[test]
    fn raw_delta_ignores_offset() {
        let value = ChangeFormula::RawDelta
            .apply(
                &reduction(Some(15000.0), Some(15100.0), Some(100.0)),
                Normalization::KelvinToCelsius { factor: 0.02 },
            )
            .unwrap();
        assert!((value - 2.0).abs() < 1e-9);
    }

    #[test]
    fn relative_to_baseline_divides_by_before() {
        let value = ChangeFormula::RelativeToBaseline
            .apply(
                &reduction(Some(0.00004), Some(0.00005), Some(0.00001)),
                Normalization::MolToMicromol,
            )
            .unwrap();
        assert!((value - 25.0).abs() < 1e-6);
    }

    #[test]
    fn undefined_inputs_yield_none() {
        let relative = ChangeFormula::RelativeToBaseline;
        assert_eq!(
            relative.apply(&reduction(Some(0.0), Some(1.0), Some(1.0)), Normalization::Identity),
            None
        );
        assert_eq!(
            relative.apply(&reduction(None, Some(1.0), Some(1.0)), Normalization::Identity),
            None
        );
        assert_eq!(
            ChangeFormula::RawDelta.apply(
                &reduction(Some(1.0), Some(1.0), Some(f64::NAN)),
                Normalization::Identity
            ),
            None
        );
    }

    #[test]
    fn parameters_override_spec() {
        let spec = DatasetSpec {
            collection: "C".into(),
            band: BandExpression::band("B"),
            scale: 30.0,
            cloud_filter: Some(CloudFilter {
                property: "CLOUDY".into(),
                max_percent: 20.0,
            }),
            normalization: Normalization::Identity,
            change_formula: ChangeFormula::RawDelta,
            units: "",
            visualization: Visualization::new(0.0, 1.0, &["000000", "ffffff"]),
            attributions: vec![Attribution::new("D", "S")],
        };
        let parameters = AnalysisParameters {
            band: Some("B2".into()),
            scale: Some(100.0),
            max_cloud_percent: Some(5.0),
            ..AnalysisParameters::default()
        };

        let spec = spec.with_parameters(&parameters);
        assert_eq!(spec.band, BandExpression::band("B2"));
        assert_eq!(spec.scale, 100.0);
        assert_eq!(spec.cloud_filter.unwrap().max_percent, 5.0);
        assert_eq!(DatasetSpec::region_reducer(&parameters), Reducer::Mean);
        assert_eq!(DatasetSpec::composite_reducer(&parameters), Reducer::Median);
    }
}
