//! Geo Guardrail - policy limits for analysis plans
//!
//! Business-policy checks that run after structural validation and before
//! any remote work:
//!
//! - Time range: ordering, no future end, span in years, data-availability
//!   floor (advisory)
//! - Analysis type and data product allow-lists
//! - Area-of-interest size for explicit bounding boxes
//!
//! All checks are evaluated; the caller receives one combined error naming
//! every violation plus any advisory warnings.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod engine;
mod policy;

pub use engine::{GuardrailEngine, GuardrailOutcome, VIOLATION_SEPARATOR};
pub use policy::GuardrailPolicy;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
