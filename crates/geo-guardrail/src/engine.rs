//! Guardrail evaluation
//!
//! Every check runs regardless of earlier failures; failing messages are
//! joined into one combined error so callers see every violated limit at
//! once.

use crate::policy::GuardrailPolicy;
use chrono::{NaiveDate, Utc};
use geo_plan::{AnalysisPlan, Location, TimeRange};
use serde::Serialize;

/// Separator between individual violation messages
pub const VIOLATION_SEPARATOR: &str = "; ";

/// Result of a guardrail evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardrailOutcome {
    /// Whether the plan may proceed
    pub valid: bool,
    /// Combined violation message (present iff `!valid`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Advisory notices; never block execution
    pub warnings: Vec<String>,
}

impl GuardrailOutcome {
    /// Individual violation messages
    #[must_use]
    pub fn violations(&self) -> Vec<&str> {
        self.error
            .as_deref()
            .map(|e| e.split(VIOLATION_SEPARATOR).collect())
            .unwrap_or_default()
    }
}

/// Policy engine for validated plans
#[derive(Debug, Clone, Default)]
pub struct GuardrailEngine {
    policy: GuardrailPolicy,
}

impl GuardrailEngine {
    /// Create engine for a policy
    #[inline]
    #[must_use]
    pub fn new(policy: GuardrailPolicy) -> Self {
        Self { policy }
    }

    /// Active policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &GuardrailPolicy {
        &self.policy
    }

    /// Evaluate a plan against today's UTC date
    #[must_use]
    pub fn evaluate(&self, plan: &AnalysisPlan) -> GuardrailOutcome {
        self.evaluate_at(plan, Utc::now().date_naive())
    }

    /// Evaluate a plan as of `today`
    ///
    /// Runs the time-range, analysis-type, data-product and AOI-size checks
    /// unconditionally and joins every failure.
    #[must_use]
    pub fn evaluate_at(&self, plan: &AnalysisPlan, today: NaiveDate) -> GuardrailOutcome {
        let mut violations: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        violations.extend(self.check_time_range(plan, today, &mut warnings));
        violations.extend(self.check_analysis_type(plan));
        violations.extend(self.check_data_product(plan));
        violations.extend(self.check_area(plan.location()));

        let outcome = if violations.is_empty() {
            GuardrailOutcome {
                valid: true,
                error: None,
                warnings,
            }
        } else {
            GuardrailOutcome {
                valid: false,
                error: Some(violations.join(VIOLATION_SEPARATOR)),
                warnings,
            }
        };

        if outcome.valid {
            tracing::debug!(
                warnings = outcome.warnings.len(),
                "Guardrails passed for {} / {}",
                plan.analysis_type(),
                plan.data_product()
            );
        } else {
            tracing::info!(
                violations = violations.len(),
                "Guardrails blocked plan: {}",
                outcome.error.as_deref().unwrap_or_default()
            );
        }

        outcome
    }

    fn check_time_range(
        &self,
        plan: &AnalysisPlan,
        today: NaiveDate,
        warnings: &mut Vec<String>,
    ) -> Vec<String> {
        let range: &TimeRange = plan.time_range();
        let mut violations = Vec::new();

        if range.start() >= range.end() {
            violations.push(format!(
                "Start date {} must be before end date {}",
                range.start(),
                range.end()
            ));
        }

        if range.end() > today {
            violations.push(format!(
                "End date {} is in the future (today is {})",
                range.end(),
                today
            ));
        }

        let years = range.span_years();
        if years > self.policy.max_time_range_years {
            violations.push(format!(
                "Time range of {:.2} years exceeds the maximum of {} years",
                years, self.policy.max_time_range_years
            ));
        }

        if let Some(floor) = self.policy.availability_floor(plan.data_product()) {
            if range.start() < floor {
                warnings.push(format!(
                    "{} data is generally unavailable before {}; \
                     earlier periods will have no coverage",
                    plan.data_product(),
                    floor
                ));
            }
        }

        violations
    }

    fn check_analysis_type(&self, plan: &AnalysisPlan) -> Option<String> {
        let requested = plan.analysis_type();
        if self.policy.allowed_analysis_types.contains(&requested) {
            return None;
        }
        Some(format!(
            "Analysis type '{}' is not allowed; allowed types: {}",
            requested,
            join(self.policy.allowed_analysis_types.iter())
        ))
    }

    fn check_data_product(&self, plan: &AnalysisPlan) -> Option<String> {
        let requested = plan.data_product();
        if self.policy.allowed_data_products.contains(&requested) {
            return None;
        }
        Some(format!(
            "Data product '{}' is not allowed; allowed products: {}",
            requested,
            join(self.policy.allowed_data_products.iter())
        ))
    }

    // Named locations are sized by the resolver, not here.
    fn check_area(&self, location: &Location) -> Option<String> {
        let bbox = location.as_bbox()?;
        let max = self.policy.max_aoi_degrees;
        let (width, height) = (bbox.width(), bbox.height());

        if width <= max && height <= max {
            return None;
        }
        Some(format!(
            "Area of interest {width:.2}° x {height:.2}° exceeds the maximum of {max}° per side"
        ))
    }
}

fn join<T: std::fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}
