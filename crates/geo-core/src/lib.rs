//! Geo Core - analysis pipeline orchestration
//!
//! Ties the workspace together:
//! - Validates raw plans and enforces guardrail policy
//! - Serves repeated plans from the artifact cache
//! - Resolves locations, routes to a workflow and executes it
//! - Assembles the outbound [`AnalysisArtifact`]
//!
//! # Example
//!
//! ```rust,ignore
//! use geo_core::{AnalysisPipeline, PipelineConfig};
//!
//! # use std::sync::Arc;
//! # use geo_workflow::ComputeEngine;
//! # async fn example(engine: Arc<dyn ComputeEngine>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::from_file("geo-analyst.toml")?;
//! let pipeline = AnalysisPipeline::from_config(engine, &config)?;
//!
//! let artifact = pipeline.run(&serde_json::from_str(PLAN_JSON)?).await?;
//! println!("{} points, cached: {}", artifact.point_count(), artifact.metadata.cached);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod artifact;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod telemetry;

pub use artifact::{AnalysisArtifact, ArtifactMetadata, ArtifactStats};
pub use config::{ConfigError, PipelineConfig};
pub use error::{AnalysisError, Result};
pub use pipeline::{AnalysisPipeline, PlanCheck, Preflight};
pub use telemetry::{init_tracing, TelemetryConfig};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running analyses
    pub use crate::{AnalysisArtifact, AnalysisError, AnalysisPipeline, PipelineConfig};
    pub use geo_workflow::ComputeEngine;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
