//! Mode dispatch
//!
//! Maps an analysis type onto one of the three executors.

use crate::change::ChangeExecutor;
use crate::composite::CompositeExecutor;
use crate::engine::ComputeEngine;
use crate::error::WorkflowError;
use crate::result::WorkflowResult;
use crate::timeseries::{ExecutorConfig, TimeSeriesExecutor};
use crate::workflow::Workflow;
use geo_plan::{AnalysisPlan, AnalysisType, BoundingBox};
use std::sync::Arc;

/// How a plan is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Bucketed series plus statistics
    TimeSeries,
    /// Before/after scalar
    Change,
    /// Composite only
    Composite,
}

impl ExecutionMode {
    /// Mode for an analysis type
    #[must_use]
    pub const fn for_analysis(analysis_type: AnalysisType) -> Self {
        match analysis_type {
            AnalysisType::Change => ExecutionMode::Change,
            AnalysisType::SingleDateMap => ExecutionMode::Composite,
            AnalysisType::Timeseries
            | AnalysisType::ZonalStatistics
            | AnalysisType::Anomaly
            | AnalysisType::SeasonalTrend => ExecutionMode::TimeSeries,
        }
    }
}

/// Runs workflows in the mode their plan asks for
#[derive(Debug, Clone)]
pub struct WorkflowExecutor {
    time_series: TimeSeriesExecutor,
    change: ChangeExecutor,
    composite: CompositeExecutor,
}

impl WorkflowExecutor {
    /// Create executors sharing one engine
    #[must_use]
    pub fn new(engine: Arc<dyn ComputeEngine>, config: ExecutorConfig) -> Self {
        Self {
            time_series: TimeSeriesExecutor::new(Arc::clone(&engine), config),
            change: ChangeExecutor::new(Arc::clone(&engine)),
            composite: CompositeExecutor::new(engine),
        }
    }

    /// Replace the time-series executor (e.g. for a sub-second timeout)
    #[inline]
    #[must_use]
    pub fn with_time_series(mut self, executor: TimeSeriesExecutor) -> Self {
        self.time_series = executor;
        self
    }

    /// Execute a plan
    ///
    /// # Errors
    /// Propagates the selected executor's [`WorkflowError`].
    pub async fn execute(
        &self,
        workflow: &dyn Workflow,
        plan: &AnalysisPlan,
        bounds: &BoundingBox,
    ) -> Result<WorkflowResult, WorkflowError> {
        match ExecutionMode::for_analysis(plan.analysis_type()) {
            ExecutionMode::TimeSeries => self.time_series.run(workflow, plan, bounds).await,
            ExecutionMode::Change => self.change.run(workflow, plan, bounds).await,
            ExecutionMode::Composite => self.composite.run(workflow, plan, bounds).await,
        }
    }
}
