//! Testing utilities for the geo-analyst workspace
//!
//! Shared fixtures and a scripted [`ComputeEngine`] fake.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::NaiveDate;
use geo_plan::{AnalysisPlan, BoundingBox, PlanValidator};
use geo_workflow::{
    ChangeReduction, ChangeRequest, CompositeRequest, ComputeEngine, MapLayer, ReductionRequest,
    RemoteComputeError,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn bbox(west: f64, south: f64, east: f64, north: f64) -> BoundingBox {
    BoundingBox::new(west, south, east, north).unwrap()
}

/// Small box around Nairobi
pub fn nairobi_bbox() -> BoundingBox {
    bbox(36.65, -1.45, 37.1, -1.16)
}

/// Raw plan JSON with sensible defaults
pub fn raw_plan(analysis: &str, product: &str, start: &str, end: &str, location: Value) -> Value {
    json!({
        "analysisType": analysis,
        "dataProduct": product,
        "datasetIds": ["TEST/COLLECTION"],
        "timeRange": { "start": start, "end": end },
        "location": location,
        "outputs": ["map", "timeseries", "statistics"]
    })
}

pub fn plan_from(raw: &Value) -> AnalysisPlan {
    PlanValidator::validate(raw).unwrap()
}

pub fn plan(analysis: &str, product: &str, start: &str, end: &str) -> AnalysisPlan {
    plan_from(&raw_plan(analysis, product, start, end, json!("Nairobi")))
}

/// What the fake engine does for one bucket
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BucketBehavior {
    Value(f64),
    /// Engine found no observations
    Missing,
    Fail,
    /// Reply after a delay
    Delayed(Duration, f64),
    /// Never reply
    Hang,
}

/// Scripted compute engine
///
/// Bucket behavior is keyed by the first day of the bucket's date window;
/// unscripted buckets return the default behavior.
#[derive(Debug)]
pub struct FakeEngine {
    buckets: HashMap<NaiveDate, BucketBehavior>,
    default: BucketBehavior,
    change: Result<ChangeReduction, RemoteComputeError>,
    composite_fails: bool,
    reductions: Mutex<Vec<ReductionRequest>>,
    composites: Mutex<Vec<CompositeRequest>>,
    changes: Mutex<Vec<ChangeRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeEngine {
    /// Every bucket returns `value`
    pub fn constant(value: f64) -> Self {
        Self::with_default(BucketBehavior::Value(value))
    }

    pub fn with_default(default: BucketBehavior) -> Self {
        Self {
            buckets: HashMap::new(),
            default,
            change: Ok(ChangeReduction::default()),
            composite_fails: false,
            reductions: Mutex::new(Vec::new()),
            composites: Mutex::new(Vec::new()),
            changes: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn bucket(mut self, start: NaiveDate, behavior: BucketBehavior) -> Self {
        self.buckets.insert(start, behavior);
        self
    }

    pub fn change(mut self, before: f64, after: f64, delta: f64) -> Self {
        self.change = Ok(ChangeReduction {
            before: Some(before),
            after: Some(after),
            delta: Some(delta),
        });
        self
    }

    pub fn change_reduction(mut self, reduction: ChangeReduction) -> Self {
        self.change = Ok(reduction);
        self
    }

    pub fn failing_change(mut self) -> Self {
        self.change = Err(RemoteComputeError::Request("change reduction failed".into()));
        self
    }

    pub fn failing_composite(mut self) -> Self {
        self.composite_fails = true;
        self
    }

    pub fn reduction_calls(&self) -> Vec<ReductionRequest> {
        self.reductions.lock().clone()
    }

    pub fn composite_calls(&self) -> Vec<CompositeRequest> {
        self.composites.lock().clone()
    }

    pub fn change_calls(&self) -> Vec<ChangeRequest> {
        self.changes.lock().clone()
    }

    /// Highest number of concurrent `reduce_region` calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.reductions.lock().len() + self.composites.lock().len() + self.changes.lock().len()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ComputeEngine for FakeEngine {
    async fn reduce_region(
        &self,
        request: &ReductionRequest,
    ) -> Result<Option<f64>, RemoteComputeError> {
        self.reductions.lock().push(request.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let behavior = self
            .buckets
            .get(&request.window.start)
            .copied()
            .unwrap_or(self.default);

        // Yield so sibling buckets overlap
        tokio::task::yield_now().await;

        match behavior {
            BucketBehavior::Value(v) => Ok(Some(v)),
            BucketBehavior::Missing => Ok(None),
            BucketBehavior::Fail => Err(RemoteComputeError::Request(format!(
                "bucket {} failed",
                request.window.start
            ))),
            BucketBehavior::Delayed(delay, v) => {
                tokio::time::sleep(delay).await;
                Ok(Some(v))
            }
            BucketBehavior::Hang => std::future::pending().await,
        }
    }

    async fn composite(&self, request: &CompositeRequest) -> Result<MapLayer, RemoteComputeError> {
        self.composites.lock().push(request.clone());
        if self.composite_fails {
            return Err(RemoteComputeError::Unavailable("composite failed".into()));
        }
        Ok(MapLayer {
            tile_url: format!("https://tiles.test/{}/{{z}}/{{x}}/{{y}}", request.collection),
            bounds: request.bounds,
        })
    }

    async fn reduce_change(
        &self,
        request: &ChangeRequest,
    ) -> Result<ChangeReduction, RemoteComputeError> {
        self.changes.lock().push(request.clone());
        self.change.clone()
    }
}
