//! Geo Workflow - dataset workflows and their executors
//!
//! # Core Concepts
//!
//! - [`Workflow`]: per-phenomenon dataset knowledge (collection, band,
//!   units, change formula, attribution)
//! - [`WorkflowRegistry`]: data product → workflow lookup
//! - [`TimeSeriesExecutor`]: calendar buckets fanned out to the
//!   [`ComputeEngine`] with per-bucket fault isolation
//! - [`ChangeExecutor`]: before/after halves reduced to one scalar
//! - [`summarize`]: mean, extrema, spread and trend of a series
//!
//! # Example
//!
//! ```rust,ignore
//! use geo_workflow::{ExecutorConfig, WorkflowExecutor, WorkflowRegistry};
//!
//! let registry = WorkflowRegistry::with_defaults();
//! let executor = WorkflowExecutor::new(engine, ExecutorConfig::default());
//!
//! let workflow = registry.resolve(plan.data_product())?;
//! let result = executor.execute(workflow.as_ref(), &plan, &bbox).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod bucket;
mod change;
mod composite;
mod dataset;
mod engine;
mod error;
mod executor;
mod registry;
mod result;
mod statistics;
mod timeseries;
mod workflow;
pub mod workflows;

pub use bucket::{last_day_of_month, partition, Granularity, TimeBucket};
pub use change::{split_windows, ChangeExecutor};
pub use composite::{composite_request, CompositeExecutor};
pub use dataset::{ChangeFormula, DatasetSpec, Normalization};
pub use engine::{
    BandExpression, ChangeReduction, ChangeRequest, CloudFilter, CompositeRequest, ComputeEngine,
    DateWindow, MapLayer, ReductionRequest, RemoteComputeError, Visualization,
};
pub use error::WorkflowError;
pub use executor::{ExecutionMode, WorkflowExecutor};
pub use registry::WorkflowRegistry;
pub use result::{Attribution, TimeSeriesPoint, WorkflowResult};
pub use statistics::{
    format_trend, percent_change, summarize, SeriesStatistics, TrendClass, TREND_THRESHOLD_PERCENT,
};
pub use timeseries::{ExecutorConfig, TimeSeriesExecutor};
pub use workflow::Workflow;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
