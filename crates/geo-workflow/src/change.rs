//! Change detection
//!
//! Splits the range at its elapsed-time midpoint and compares a composite
//! of each half. The reported scalar follows the dataset's
//! [`ChangeFormula`](crate::dataset::ChangeFormula).

use crate::composite::composite_request;
use crate::dataset::DatasetSpec;
use crate::engine::{ChangeRequest, ComputeEngine, DateWindow};
use crate::error::WorkflowError;
use crate::result::WorkflowResult;
use crate::workflow::Workflow;
use geo_plan::{AnalysisPlan, BoundingBox, Reducer, TimeRange};
use std::sync::Arc;

/// `before = [start, mid)`, `after = [mid, end]`
#[must_use]
pub fn split_windows(range: &TimeRange) -> (DateWindow, DateWindow) {
    let mid = range.midpoint();
    (
        DateWindow::new(range.start(), mid),
        DateWindow::inclusive(mid, range.end()),
    )
}

/// Before/after change executor
#[derive(Clone)]
pub struct ChangeExecutor {
    engine: Arc<dyn ComputeEngine>,
}

impl std::fmt::Debug for ChangeExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeExecutor").finish_non_exhaustive()
    }
}

impl ChangeExecutor {
    /// Create executor
    #[inline]
    #[must_use]
    pub fn new(engine: Arc<dyn ComputeEngine>) -> Self {
        Self { engine }
    }

    /// Compute the change scalar and the full-range composite
    ///
    /// # Errors
    /// - [`WorkflowError::RemoteCompute`] if either engine call fails
    /// - [`WorkflowError::NoValidData`] if the scalar is undefined
    pub async fn run(
        &self,
        workflow: &dyn Workflow,
        plan: &AnalysisPlan,
        bounds: &BoundingBox,
    ) -> Result<WorkflowResult, WorkflowError> {
        let spec = workflow.resolve_dataset(plan);
        let (before, after) = split_windows(plan.time_range());

        tracing::info!(
            product = %workflow.product(),
            collection = %spec.collection,
            %before,
            %after,
            "Running change detection"
        );

        let request = ChangeRequest {
            collection: spec.collection.clone(),
            band: spec.band.clone(),
            bounds: *bounds,
            before,
            after,
            cloud_filter: spec.cloud_filter.clone(),
            composite_reducer: DatasetSpec::composite_reducer(plan.parameters()),
            region_reducer: Reducer::Mean,
            scale: spec.scale,
        };

        let reduction = self.engine.reduce_change(&request).await?;
        let change = spec
            .change_formula
            .apply(&reduction, spec.normalization)
            .ok_or_else(|| WorkflowError::NoValidData {
                product: workflow.product(),
                time_range: *plan.time_range(),
                location: plan.location().to_string(),
            })?;

        let map = self
            .engine
            .composite(&composite_request(&spec, plan, bounds))
            .await?;

        Ok(WorkflowResult {
            map: Some(map),
            time_series: None,
            statistics: None,
            change_percent: Some(change),
            units: spec.units.to_string(),
            attributions: spec.attributions,
        })
    }
}
