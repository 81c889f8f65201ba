//! Analysis pipeline
//!
//! Runs one raw plan through every stage:
//!
//! ```text
//! raw JSON → validate → guardrails → cache lookup
//!          → resolve location → route workflow → execute → cache store
//! ```
//!
//! The whole run sits under one request deadline. Guardrail warnings ride
//! along into the artifact; guardrail errors stop the run before any remote
//! work.

use crate::artifact::AnalysisArtifact;
use crate::config::PipelineConfig;
use crate::error::{AnalysisError, Result};
use chrono::{NaiveDate, Utc};
use geo_cache::{CacheKey, CacheStore, ResultCache};
use geo_guardrail::{GuardrailEngine, GuardrailOutcome};
use geo_location::LocationResolver;
use geo_plan::{AnalysisPlan, PlanValidator};
use geo_workflow::{ComputeEngine, WorkflowExecutor, WorkflowRegistry};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

/// Outcome of validation and guardrails, without execution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCheck {
    /// Validated plan
    pub plan: AnalysisPlan,
    /// Guardrail verdict
    pub guardrails: GuardrailOutcome,
    /// Fingerprint the artifact would be cached under
    pub cache_key: String,
}

/// Validation and policy stage, usable without a compute engine
#[derive(Debug, Clone, Default)]
pub struct Preflight {
    guardrails: GuardrailEngine,
    today: Option<NaiveDate>,
}

impl Preflight {
    /// Create preflight for a guardrail engine
    #[inline]
    #[must_use]
    pub fn new(guardrails: GuardrailEngine) -> Self {
        Self {
            guardrails,
            today: None,
        }
    }

    /// Pin "today" for future-date checks
    #[inline]
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Validate and evaluate guardrails
    ///
    /// A guardrail failure is reported in the returned outcome, not as an
    /// error.
    ///
    /// # Errors
    /// Returns [`AnalysisError::Validation`] for a malformed plan.
    pub fn check(&self, raw: &Value) -> Result<PlanCheck> {
        let plan = PlanValidator::validate(raw)?;
        let guardrails = self.evaluate(&plan);
        let cache_key = CacheKey::analysis(&plan).to_string();
        Ok(PlanCheck {
            plan,
            guardrails,
            cache_key,
        })
    }

    /// Evaluate guardrails for a validated plan
    #[must_use]
    pub fn evaluate(&self, plan: &AnalysisPlan) -> GuardrailOutcome {
        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
        self.guardrails.evaluate_at(plan, today)
    }
}

/// End-to-end analysis pipeline
#[derive(Clone)]
pub struct AnalysisPipeline {
    preflight: Preflight,
    cache: Arc<dyn ResultCache<AnalysisArtifact>>,
    resolver: LocationResolver,
    registry: WorkflowRegistry,
    executor: WorkflowExecutor,
    deadline: Duration,
}

impl std::fmt::Debug for AnalysisPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisPipeline")
            .field("preflight", &self.preflight)
            .field("resolver", &self.resolver)
            .field("registry", &self.registry.supported())
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl AnalysisPipeline {
    /// Build a pipeline from configuration around a compute engine
    ///
    /// # Errors
    /// Returns [`AnalysisError::Config`] if the configuration is invalid or
    /// the geocoder client cannot be built.
    pub fn from_config(engine: Arc<dyn ComputeEngine>, config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let resolver = LocationResolver::from_config(&config.geocoder).map_err(|e| {
            crate::config::ConfigError::Invalid(format!("geocoder: {e}"))
        })?;

        Ok(Self {
            preflight: Preflight::new(GuardrailEngine::new(config.guardrails.clone())),
            cache: Arc::new(CacheStore::from_config(&config.cache)),
            resolver,
            registry: WorkflowRegistry::with_defaults(),
            executor: WorkflowExecutor::new(engine, config.executor),
            deadline: config.request_deadline(),
        })
    }

    /// Build a pipeline with default configuration and fallback-only
    /// location resolution
    #[must_use]
    pub fn new(engine: Arc<dyn ComputeEngine>) -> Self {
        let config = PipelineConfig::default();
        Self {
            preflight: Preflight::new(GuardrailEngine::new(config.guardrails.clone())),
            cache: Arc::new(CacheStore::from_config(&config.cache)),
            resolver: LocationResolver::new(),
            registry: WorkflowRegistry::with_defaults(),
            executor: WorkflowExecutor::new(engine, config.executor),
            deadline: config.request_deadline(),
        }
    }

    /// With artifact cache
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ResultCache<AnalysisArtifact>>) -> Self {
        self.cache = cache;
        self
    }

    /// With location resolver
    #[inline]
    #[must_use]
    pub fn with_resolver(mut self, resolver: LocationResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// With workflow registry
    #[inline]
    #[must_use]
    pub fn with_registry(mut self, registry: WorkflowRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// With executor
    #[inline]
    #[must_use]
    pub fn with_executor(mut self, executor: WorkflowExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// With overall request deadline
    #[inline]
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Pin "today" for guardrail checks
    #[inline]
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.preflight = self.preflight.with_today(today);
        self
    }

    /// Overall request deadline
    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Validate and evaluate guardrails without executing
    ///
    /// # Errors
    /// Returns [`AnalysisError::Validation`] for a malformed plan.
    pub fn check(&self, raw: &Value) -> Result<PlanCheck> {
        self.preflight.check(raw)
    }

    /// Cache key of the explanation generated for a plan
    #[inline]
    #[must_use]
    pub fn explanation_key(&self, plan: &AnalysisPlan) -> CacheKey {
        CacheKey::explanation(plan)
    }

    /// Run a raw plan end to end
    ///
    /// # Errors
    /// - [`AnalysisError::Validation`] for a malformed plan
    /// - [`AnalysisError::GuardrailViolation`] when policy limits are broken
    /// - [`AnalysisError::Location`] when the location cannot be resolved
    /// - [`AnalysisError::UnsupportedWorkflow`], [`AnalysisError::NoValidData`]
    ///   or [`AnalysisError::RemoteCompute`] from execution
    /// - [`AnalysisError::DeadlineExceeded`] when the request deadline elapses
    pub async fn run(&self, raw: &Value) -> Result<AnalysisArtifact> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("analysis", %request_id);

        async {
            match tokio::time::timeout(self.deadline, self.run_stages(raw)).await {
                Ok(result) => result,
                Err(_) => {
                    let deadline_ms = u64::try_from(self.deadline.as_millis()).unwrap_or(u64::MAX);
                    tracing::warn!(deadline_ms, "Analysis deadline exceeded");
                    Err(AnalysisError::DeadlineExceeded { deadline_ms })
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_stages(&self, raw: &Value) -> Result<AnalysisArtifact> {
        let started = Instant::now();

        let plan = PlanValidator::validate(raw)?;
        tracing::info!(
            analysis = %plan.analysis_type(),
            product = %plan.data_product(),
            time_range = %plan.time_range(),
            "Plan validated"
        );

        let outcome = self.preflight.evaluate(&plan);
        if !outcome.valid {
            let message = outcome.error.unwrap_or_default();
            return Err(AnalysisError::GuardrailViolation {
                message,
                warnings: outcome.warnings,
            });
        }

        let key = CacheKey::analysis(&plan);
        if let Some(artifact) = self.cache.get(&key) {
            tracing::debug!(%key, "Cache hit");
            return Ok(artifact.into_cached());
        }
        tracing::debug!(%key, "Cache miss");

        let bounds = self.resolver.resolve(plan.location()).await?;
        let workflow = self.registry.resolve(plan.data_product())?;
        let result = self.executor.execute(workflow.as_ref(), &plan, &bounds).await?;

        let compute_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let artifact =
            AnalysisArtifact::from_result(&plan, result, outcome.warnings, compute_time_ms);

        tracing::info!(
            %key,
            points = artifact.point_count(),
            compute_time_ms,
            "Analysis complete"
        );

        self.cache.set(key, artifact.clone());
        Ok(artifact)
    }
}
