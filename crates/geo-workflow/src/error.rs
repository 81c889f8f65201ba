//! Workflow errors

use crate::engine::RemoteComputeError;
use geo_plan::{DataProduct, TimeRange};

/// Workflow execution errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorkflowError {
    /// Every bucket was skipped, or the change scalar is undefined
    #[error("no valid {product} data for {time_range} over {location}")]
    NoValidData {
        /// Requested phenomenon
        product: DataProduct,
        /// Requested window
        time_range: TimeRange,
        /// Requested location, as given
        location: String,
    },

    /// No workflow registered for the data product
    #[error(
        "unsupported data product '{product}'; supported: {}",
        .supported.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(", ")
    )]
    UnsupportedWorkflow {
        /// Requested phenomenon
        product: DataProduct,
        /// Every registered phenomenon
        supported: Vec<DataProduct>,
    },

    /// Non-recoverable remote failure (composite or change reduction)
    #[error(transparent)]
    RemoteCompute(#[from] RemoteComputeError),
}
