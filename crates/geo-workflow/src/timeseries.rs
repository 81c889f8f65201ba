//! Time-bucketed aggregation
//!
//! The shared algorithm behind every time-series workflow:
//!
//! 1. Partition the range into calendar buckets
//! 2. Fan one reduction per bucket out to the engine, bounded by a semaphore
//! 3. Skip buckets that fail, time out, or return no usable number
//! 4. Reassemble survivors in chronological order and normalize units
//! 5. Compute one full-range composite for the map
//!
//! An empty series after every bucket is a terminal `NoValidData` error;
//! a composite failure propagates.

use crate::bucket::{partition, TimeBucket};
use crate::composite::composite_request;
use crate::dataset::DatasetSpec;
use crate::engine::{ComputeEngine, ReductionRequest};
use crate::error::WorkflowError;
use crate::result::{TimeSeriesPoint, WorkflowResult};
use crate::statistics::summarize;
use crate::workflow::Workflow;
use futures::future::join_all;
use geo_plan::{AnalysisPlan, BoundingBox};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;

/// Bucket fan-out configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Maximum bucket reductions in flight per request
    pub max_concurrent_buckets: usize,
    /// Per-bucket time limit in seconds
    pub bucket_timeout_secs: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_buckets: 4,
            bucket_timeout_secs: 60,
        }
    }
}

impl ExecutorConfig {
    /// With concurrency limit (at least one)
    #[inline]
    #[must_use]
    pub fn with_max_concurrent_buckets(mut self, n: usize) -> Self {
        self.max_concurrent_buckets = n.max(1);
        self
    }

    /// With per-bucket timeout
    #[inline]
    #[must_use]
    pub fn with_bucket_timeout(mut self, timeout: Duration) -> Self {
        self.bucket_timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Per-bucket timeout
    #[inline]
    #[must_use]
    pub fn bucket_timeout(&self) -> Duration {
        Duration::from_secs(self.bucket_timeout_secs)
    }
}

/// Time-bucketed aggregation executor
#[derive(Clone)]
pub struct TimeSeriesExecutor {
    engine: Arc<dyn ComputeEngine>,
    config: ExecutorConfig,
    bucket_timeout: Duration,
}

impl std::fmt::Debug for TimeSeriesExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeSeriesExecutor")
            .field("config", &self.config)
            .field("bucket_timeout", &self.bucket_timeout)
            .finish_non_exhaustive()
    }
}

impl TimeSeriesExecutor {
    /// Create executor
    #[must_use]
    pub fn new(engine: Arc<dyn ComputeEngine>, config: ExecutorConfig) -> Self {
        Self {
            engine,
            bucket_timeout: config.bucket_timeout(),
            config,
        }
    }

    /// Override the per-bucket timeout with sub-second precision
    #[inline]
    #[must_use]
    pub fn with_bucket_timeout(mut self, timeout: Duration) -> Self {
        self.bucket_timeout = timeout;
        self
    }

    /// Run a workflow over a plan's range
    ///
    /// # Errors
    /// - [`WorkflowError::NoValidData`] when no bucket yields a value
    /// - [`WorkflowError::RemoteCompute`] when the composite fails
    pub async fn run(
        &self,
        workflow: &dyn Workflow,
        plan: &AnalysisPlan,
        bounds: &BoundingBox,
    ) -> Result<WorkflowResult, WorkflowError> {
        let spec = workflow.resolve_dataset(plan);
        let buckets = partition(plan.time_range(), workflow.granularity(plan));

        tracing::info!(
            product = %workflow.product(),
            collection = %spec.collection,
            buckets = buckets.len(),
            "Running time-series aggregation"
        );

        let series = self.collect_series(&spec, plan, bounds, &buckets).await;

        if series.is_empty() {
            return Err(WorkflowError::NoValidData {
                product: workflow.product(),
                time_range: *plan.time_range(),
                location: plan.location().to_string(),
            });
        }

        tracing::info!(
            points = series.len(),
            skipped = buckets.len() - series.len(),
            "Time series assembled"
        );

        let map = self
            .engine
            .composite(&composite_request(&spec, plan, bounds))
            .await?;

        Ok(WorkflowResult {
            map: Some(map),
            statistics: summarize(&series),
            time_series: Some(series),
            change_percent: None,
            units: spec.units.to_string(),
            attributions: spec.attributions,
        })
    }

    /// Reduce every bucket, returning surviving points in bucket order
    pub async fn collect_series(
        &self,
        spec: &DatasetSpec,
        plan: &AnalysisPlan,
        bounds: &BoundingBox,
        buckets: &[TimeBucket],
    ) -> Vec<TimeSeriesPoint> {
        let semaphore = Semaphore::new(self.config.max_concurrent_buckets.max(1));
        let semaphore = &semaphore;
        let reducer = DatasetSpec::region_reducer(plan.parameters());

        let tasks = buckets.iter().map(|bucket| {
            let request = ReductionRequest {
                collection: spec.collection.clone(),
                band: spec.band.clone(),
                bounds: *bounds,
                window: bucket.window(),
                cloud_filter: spec.cloud_filter.clone(),
                reducer,
                scale: spec.scale,
            };
            async move {
                let _permit = semaphore.acquire().await.ok()?;
                self.reduce_bucket(bucket, &request).await
            }
        });

        // join_all yields outputs in input order, whatever the completion order
        join_all(tasks)
            .await
            .into_iter()
            .zip(buckets)
            .filter_map(|(raw, bucket)| {
                raw.map(|value| {
                    TimeSeriesPoint::new(
                        bucket.representative_date(),
                        spec.normalization.apply(value),
                    )
                    .with_label(bucket.label())
                })
            })
            .collect()
    }

    async fn reduce_bucket(&self, bucket: &TimeBucket, request: &ReductionRequest) -> Option<f64> {
        match timeout(self.bucket_timeout, self.engine.reduce_region(request)).await {
            Ok(Ok(Some(value))) if value.is_finite() => Some(value),
            Ok(Ok(_)) => {
                tracing::debug!(bucket = %bucket.label(), "No coverage in bucket");
                None
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    bucket = %bucket.label(),
                    error = %e,
                    "Bucket reduction failed, skipping"
                );
                None
            }
            Err(_) => {
                tracing::warn!(
                    bucket = %bucket.label(),
                    timeout_ms = self.bucket_timeout.as_millis() as u64,
                    "Bucket reduction timed out, skipping"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_and_builders() {
        let config = ExecutorConfig::default();
        assert_eq!(config.max_concurrent_buckets, 4);
        assert_eq!(config.bucket_timeout(), Duration::from_secs(60));

        let config = config
            .with_max_concurrent_buckets(0)
            .with_bucket_timeout(Duration::from_millis(10));
        assert_eq!(config.max_concurrent_buckets, 1);
        assert_eq!(config.bucket_timeout_secs, 1);
    }
}
