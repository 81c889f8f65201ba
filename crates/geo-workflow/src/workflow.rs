//! Dataset workflow seam

use crate::bucket::Granularity;
use crate::dataset::DatasetSpec;
use geo_plan::{AnalysisPlan, DataProduct};
use std::fmt::Debug;

/// One phenomenon's dataset knowledge
///
/// A workflow never talks to the engine itself; it describes what to
/// reduce and the shared executors do the rest. Adding a phenomenon means
/// one new implementation and one registry entry.
pub trait Workflow: Send + Sync + Debug {
    /// Phenomenon served
    fn product(&self) -> DataProduct;

    /// Bucket size for a plan's time series
    fn granularity(&self, _plan: &AnalysisPlan) -> Granularity {
        Granularity::Monthly
    }

    /// Dataset parameters for a plan, before plan overrides
    fn dataset(&self, plan: &AnalysisPlan) -> DatasetSpec;

    /// Dataset parameters with the plan's overrides applied
    fn resolve_dataset(&self, plan: &AnalysisPlan) -> DatasetSpec {
        self.dataset(plan).with_parameters(plan.parameters())
    }
}
