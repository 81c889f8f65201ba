//! Pipeline error type
//!
//! Every stage's error folds into [`AnalysisError`]. Callers branch on
//! [`AnalysisError::kind`], which is stable across releases.

use crate::config::ConfigError;
use geo_location::LocationError;
use geo_plan::{DataProduct, TimeRange, ValidationErrors};
use geo_workflow::{RemoteComputeError, WorkflowError};

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Analysis pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Raw plan failed structural validation
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Plan breaks one or more policy limits
    #[error("guardrail violation: {message}")]
    GuardrailViolation {
        /// Every violation, joined
        message: String,
        /// Advisory notices raised alongside
        warnings: Vec<String>,
    },

    /// Location could not be resolved
    #[error(transparent)]
    Location(#[from] LocationError),

    /// Remote engine failed in a way that invalidates the result
    #[error(transparent)]
    RemoteCompute(RemoteComputeError),

    /// No usable data for the request
    #[error("no valid {product} data for {time_range} over {location}")]
    NoValidData {
        /// Requested phenomenon
        product: DataProduct,
        /// Requested window
        time_range: TimeRange,
        /// Requested location
        location: String,
    },

    /// No workflow serves the data product
    #[error(
        "unsupported data product '{product}'; supported: {}",
        .supported.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(", ")
    )]
    UnsupportedWorkflow {
        /// Requested phenomenon
        product: DataProduct,
        /// Every served phenomenon
        supported: Vec<DataProduct>,
    },

    /// The overall request deadline elapsed
    #[error("analysis exceeded its deadline of {deadline_ms} ms")]
    DeadlineExceeded {
        /// Configured deadline
        deadline_ms: u64,
    },

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<WorkflowError> for AnalysisError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::NoValidData {
                product,
                time_range,
                location,
            } => AnalysisError::NoValidData {
                product,
                time_range,
                location,
            },
            WorkflowError::UnsupportedWorkflow { product, supported } => {
                AnalysisError::UnsupportedWorkflow { product, supported }
            }
            WorkflowError::RemoteCompute(e) => AnalysisError::RemoteCompute(e),
        }
    }
}

impl AnalysisError {
    /// Stable snake_case category
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Validation(_) => "validation",
            AnalysisError::GuardrailViolation { .. } => "guardrail_violation",
            AnalysisError::Location(e) if e.is_not_found() => "location_not_found",
            AnalysisError::Location(_) => "invalid_location",
            AnalysisError::RemoteCompute(_) => "remote_compute",
            AnalysisError::NoValidData { .. } => "no_valid_data",
            AnalysisError::UnsupportedWorkflow { .. } => "unsupported_workflow",
            AnalysisError::DeadlineExceeded { .. } => "deadline_exceeded",
            AnalysisError::Config(_) => "config",
        }
    }

    /// Check if retrying the same request could succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            AnalysisError::RemoteCompute(e) => e.is_retryable(),
            AnalysisError::DeadlineExceeded { .. } => true,
            _ => false,
        }
    }

    /// Check if the caller must change the request
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::Validation(_)
                | AnalysisError::GuardrailViolation { .. }
                | AnalysisError::Location(_)
                | AnalysisError::UnsupportedWorkflow { .. }
        )
    }

    /// Advisory warnings attached to the error, if any
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        match self {
            AnalysisError::GuardrailViolation { warnings, .. } => warnings,
            _ => &[],
        }
    }
}
