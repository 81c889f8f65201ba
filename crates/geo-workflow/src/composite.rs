//! Full-range composites
//!
//! Every mode renders one composite over the whole requested range for the
//! map; `single_date_map` plans render only that.

use crate::dataset::DatasetSpec;
use crate::engine::{CompositeRequest, ComputeEngine, DateWindow};
use crate::error::WorkflowError;
use crate::result::WorkflowResult;
use crate::workflow::Workflow;
use geo_plan::{AnalysisPlan, BoundingBox};
use std::sync::Arc;

/// Composite request covering the plan's full range
#[must_use]
pub fn composite_request(
    spec: &DatasetSpec,
    plan: &AnalysisPlan,
    bounds: &BoundingBox,
) -> CompositeRequest {
    let range = plan.time_range();
    CompositeRequest {
        collection: spec.collection.clone(),
        band: spec.band.clone(),
        bounds: *bounds,
        window: DateWindow::inclusive(range.start(), range.end()),
        cloud_filter: spec.cloud_filter.clone(),
        reducer: DatasetSpec::composite_reducer(plan.parameters()),
        visualization: spec.visualization.clone(),
    }
}

/// Composite-only executor
#[derive(Clone)]
pub struct CompositeExecutor {
    engine: Arc<dyn ComputeEngine>,
}

impl std::fmt::Debug for CompositeExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeExecutor").finish_non_exhaustive()
    }
}

impl CompositeExecutor {
    /// Create executor
    #[inline]
    #[must_use]
    pub fn new(engine: Arc<dyn ComputeEngine>) -> Self {
        Self { engine }
    }

    /// Render the full-range composite
    ///
    /// # Errors
    /// Returns [`WorkflowError::RemoteCompute`] if the engine fails.
    pub async fn run(
        &self,
        workflow: &dyn Workflow,
        plan: &AnalysisPlan,
        bounds: &BoundingBox,
    ) -> Result<WorkflowResult, WorkflowError> {
        let spec = workflow.resolve_dataset(plan);
        tracing::info!(
            product = %workflow.product(),
            collection = %spec.collection,
            "Rendering composite"
        );

        let map = self
            .engine
            .composite(&composite_request(&spec, plan, bounds))
            .await?;

        Ok(WorkflowResult::composite(map, spec.units, spec.attributions))
    }
}
