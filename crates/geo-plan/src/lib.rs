//! Geo Plan - analysis request model
//!
//! The entry point of every analysis: raw, planner-produced JSON is turned
//! into an immutable, strongly-typed [`AnalysisPlan`] or rejected with a
//! structured list of every offending field.
//!
//! # Core Concepts
//!
//! - [`AnalysisPlan`]: The validated request
//! - [`PlanValidator`]: Raw JSON → plan, collecting all field errors
//! - [`BoundingBox`]: `[west, south, east, north]` with enforced invariants
//! - [`TimeRange`]: Day-granularity window with `start < end`
//!
//! # Example
//!
//! ```rust,ignore
//! use geo_plan::PlanValidator;
//!
//! let raw = serde_json::json!({
//!     "analysisType": "timeseries",
//!     "dataProduct": "vegetation",
//!     "datasetIds": ["MODIS/061/MOD13Q1"],
//!     "timeRange": { "start": "2023-01-01", "end": "2023-12-31" },
//!     "location": "Nile Delta",
//!     "outputs": ["timeseries", "statistics"]
//! });
//!
//! let plan = PlanValidator::validate(&raw)?;
//! assert_eq!(plan.time_range().days(), 364);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod bbox;
mod error;
mod model;
mod validator;

pub use bbox::{BoundingBox, BoundsError, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};
pub use error::{FieldError, ValidationErrors};
pub use model::{
    AnalysisParameters, AnalysisPlan, AnalysisType, DataProduct, IndexKind, Location, OutputKind,
    Reducer, TimeRange, TimeRangeError, UnknownVariant, DAYS_PER_YEAR,
};
pub use validator::PlanValidator;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
