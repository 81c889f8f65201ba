//! Executor behaviour against a scripted engine

use geo_plan::DataProduct;
use geo_test_utils::{date, nairobi_bbox, plan, plan_from, raw_plan, BucketBehavior, FakeEngine};
use geo_workflow::{
    ChangeExecutor, ChangeReduction, ComputeEngine, ExecutorConfig, TimeSeriesExecutor,
    WorkflowError, WorkflowExecutor, WorkflowRegistry, MapLayer,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn executor(engine: &Arc<FakeEngine>) -> TimeSeriesExecutor {
    let engine: Arc<dyn ComputeEngine> = engine.clone();
    TimeSeriesExecutor::new(engine, ExecutorConfig::default())
}

fn workflow(product: DataProduct) -> Arc<dyn geo_workflow::Workflow> {
    WorkflowRegistry::with_defaults().resolve(product).unwrap()
}

fn month_starts_2024() -> Vec<chrono::NaiveDate> {
    (1..=6).map(|m| date(2024, m, 1)).collect()
}

#[tokio::test]
async fn one_failed_bucket_is_skipped() {
    let engine = Arc::new(FakeEngine::constant(2.0).bucket(date(2024, 3, 1), BucketBehavior::Fail));
    let plan = plan("timeseries", "precipitation", "2024-01-01", "2024-06-30");

    let result = executor(&engine)
        .run(workflow(DataProduct::Precipitation).as_ref(), &plan, &nairobi_bbox())
        .await
        .unwrap();

    let series = result.time_series.unwrap();
    let labels: Vec<_> = series.iter().map(|p| p.label.clone().unwrap()).collect();
    assert_eq!(labels, ["2024-01", "2024-02", "2024-04", "2024-05", "2024-06"]);
    assert_eq!(series[0].date, date(2024, 1, 15));
    assert_eq!(engine.reduction_calls().len(), 6);
    assert!(result.map.is_some());
    assert!(!result.attributions.is_empty());
}

#[tokio::test]
async fn all_failed_buckets_is_no_valid_data() {
    let engine = Arc::new(FakeEngine::with_default(BucketBehavior::Fail));
    let plan = plan("timeseries", "precipitation", "2024-01-01", "2024-06-30");

    let err = executor(&engine)
        .run(workflow(DataProduct::Precipitation).as_ref(), &plan, &nairobi_bbox())
        .await
        .unwrap_err();

    match err {
        WorkflowError::NoValidData {
            product, location, ..
        } => {
            assert_eq!(product, DataProduct::Precipitation);
            assert_eq!(location, "Nairobi");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // No composite is attempted once the series is empty
    assert!(engine.composite_calls().is_empty());
}

#[tokio::test]
async fn missing_and_non_finite_values_are_skipped() {
    let engine = Arc::new(
        FakeEngine::constant(1.0)
            .bucket(date(2024, 1, 1), BucketBehavior::Missing)
            .bucket(date(2024, 2, 1), BucketBehavior::Value(f64::NAN))
            .bucket(date(2024, 3, 1), BucketBehavior::Value(f64::INFINITY)),
    );
    let plan = plan("timeseries", "precipitation", "2024-01-01", "2024-06-30");

    let result = executor(&engine)
        .run(workflow(DataProduct::Precipitation).as_ref(), &plan, &nairobi_bbox())
        .await
        .unwrap();

    assert_eq!(result.point_count(), 3);
    assert!(result.time_series.unwrap().iter().all(|p| p.value == 1.0));
}

#[tokio::test]
async fn series_keeps_chronological_order_despite_completion_order() {
    // Earlier buckets finish last
    let mut engine = FakeEngine::constant(0.0);
    for (i, start) in month_starts_2024().into_iter().enumerate() {
        let delay = Duration::from_millis(60 - 10 * i as u64);
        engine = engine.bucket(start, BucketBehavior::Delayed(delay, i as f64));
    }
    let engine = Arc::new(engine);
    let plan = plan("timeseries", "precipitation", "2024-01-01", "2024-06-30");

    let engine_dyn: Arc<dyn ComputeEngine> = engine.clone();
    let executor = TimeSeriesExecutor::new(
        engine_dyn,
        ExecutorConfig::default().with_max_concurrent_buckets(6),
    );
    let result = executor
        .run(workflow(DataProduct::Precipitation).as_ref(), &plan, &nairobi_bbox())
        .await
        .unwrap();

    let values: Vec<f64> = result.time_series.unwrap().iter().map(|p| p.value).collect();
    assert_eq!(values, [0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[tokio::test]
async fn fan_out_is_bounded() {
    let engine = Arc::new(FakeEngine::with_default(BucketBehavior::Delayed(
        Duration::from_millis(20),
        1.0,
    )));
    let plan = plan("timeseries", "precipitation", "2023-01-01", "2023-12-31");

    let engine_dyn: Arc<dyn ComputeEngine> = engine.clone();
    let executor = TimeSeriesExecutor::new(
        engine_dyn,
        ExecutorConfig::default().with_max_concurrent_buckets(3),
    );
    let result = executor
        .run(workflow(DataProduct::Precipitation).as_ref(), &plan, &nairobi_bbox())
        .await
        .unwrap();

    assert_eq!(result.point_count(), 12);
    assert!(engine.max_in_flight() <= 3);
    assert!(engine.max_in_flight() > 1);
}

#[tokio::test]
async fn hung_bucket_times_out_without_affecting_siblings() {
    let engine = Arc::new(FakeEngine::constant(4.0).bucket(date(2024, 2, 1), BucketBehavior::Hang));
    let plan = plan("timeseries", "precipitation", "2024-01-01", "2024-03-31");

    let result = executor(&engine)
        .with_bucket_timeout(Duration::from_millis(50))
        .run(workflow(DataProduct::Precipitation).as_ref(), &plan, &nairobi_bbox())
        .await
        .unwrap();

    let labels: Vec<_> = result
        .time_series
        .unwrap()
        .into_iter()
        .map(|p| p.label.unwrap())
        .collect();
    assert_eq!(labels, ["2024-01", "2024-03"]);
}

#[tokio::test]
async fn composite_failure_propagates() {
    let engine = Arc::new(FakeEngine::constant(1.0).failing_composite());
    let plan = plan("timeseries", "precipitation", "2024-01-01", "2024-03-31");

    let err = executor(&engine)
        .run(workflow(DataProduct::Precipitation).as_ref(), &plan, &nairobi_bbox())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::RemoteCompute(_)));
}

#[tokio::test]
async fn statistics_and_normalization_flow_through() {
    // MODIS NDVI integers scaled by 10^4
    let values = [5000.0, 6000.0, 4000.0, 7000.0];
    let mut engine = FakeEngine::constant(0.0);
    for (m, v) in (1..=4).zip(values) {
        engine = engine.bucket(date(2023, m, 1), BucketBehavior::Value(v));
    }
    let engine = Arc::new(engine);
    let plan = plan("timeseries", "vegetation", "2023-01-01", "2023-04-30");

    let result = executor(&engine)
        .run(workflow(DataProduct::Vegetation).as_ref(), &plan, &nairobi_bbox())
        .await
        .unwrap();

    let stats = result.statistics.unwrap();
    assert!((stats.mean - 0.55).abs() < 1e-9);
    assert!((stats.min - 0.4).abs() < 1e-9);
    assert!((stats.max - 0.7).abs() < 1e-9);
    assert_eq!(stats.trend, "increasing (+40.0%)");
    assert_eq!(result.units, "NDVI");

    let request = &engine.reduction_calls()[0];
    assert_eq!(request.collection, "MODIS/061/MOD13Q1");
    assert_eq!(request.scale, 250.0);
    assert_eq!(request.reducer, geo_plan::Reducer::Mean);
}

#[tokio::test]
async fn yearly_workflow_uses_year_buckets() {
    let engine = Arc::new(FakeEngine::constant(0.3));
    let plan = plan("timeseries", "water", "2018-03-01", "2021-06-30");

    let result = executor(&engine)
        .run(workflow(DataProduct::Water).as_ref(), &plan, &nairobi_bbox())
        .await
        .unwrap();

    let series = result.time_series.unwrap();
    assert_eq!(series.len(), 4);
    assert_eq!(series[0].date, date(2018, 7, 1));
    assert!((series[0].value - 30.0).abs() < 1e-9);
}

#[tokio::test]
async fn sentinel2_water_uses_month_buckets() {
    let engine = Arc::new(FakeEngine::constant(0.2));
    let mut raw = raw_plan("timeseries", "water", "2023-01-01", "2023-06-30", json!("Nairobi"));
    raw["datasetIds"] = json!(["COPERNICUS/S2_SR_HARMONIZED"]);
    let plan = plan_from(&raw);

    let result = executor(&engine)
        .run(workflow(DataProduct::Water).as_ref(), &plan, &nairobi_bbox())
        .await
        .unwrap();

    let series = result.time_series.unwrap();
    assert_eq!(series.len(), 6);
    assert_eq!(series[0].label.as_deref(), Some("2023-01"));
    assert_eq!(result.units, "NDWI");
}

#[tokio::test]
async fn change_scales_vegetation_delta() {
    let engine = Arc::new(FakeEngine::constant(0.0).change(5000.0, 5500.0, 500.0));
    let plan = plan("change", "vegetation", "2020-01-01", "2023-12-31");
    let engine_dyn: Arc<dyn ComputeEngine> = engine.clone();

    let result = ChangeExecutor::new(engine_dyn)
        .run(workflow(DataProduct::Vegetation).as_ref(), &plan, &nairobi_bbox())
        .await
        .unwrap();

    // 500 * 1e-4 = 0.05 index units -> 5.0
    assert!((result.change_percent.unwrap() - 5.0).abs() < 1e-9);
    assert!(result.time_series.is_none());

    let request = &engine.change_calls()[0];
    assert_eq!(request.composite_reducer, geo_plan::Reducer::Median);
    assert_eq!(request.region_reducer, geo_plan::Reducer::Mean);
    assert_eq!(request.before.end_exclusive, request.after.start);
    assert_eq!(request.after.end_exclusive, date(2024, 1, 1));
}

#[tokio::test]
async fn change_over_one_and_two_day_ranges_sends_non_empty_windows() {
    for end in ["2024-01-02", "2024-01-03"] {
        let engine = Arc::new(FakeEngine::constant(0.0).change(5000.0, 5100.0, 100.0));
        let plan = plan("change", "vegetation", "2024-01-01", end);
        let engine_dyn: Arc<dyn ComputeEngine> = engine.clone();

        let result = ChangeExecutor::new(engine_dyn)
            .run(workflow(DataProduct::Vegetation).as_ref(), &plan, &nairobi_bbox())
            .await
            .unwrap();
        assert!(result.change_percent.is_some());

        let request = &engine.change_calls()[0];
        assert_eq!(request.before.start, date(2024, 1, 1));
        assert_eq!(request.before.end_exclusive, date(2024, 1, 2));
        assert!(request.after.end_exclusive > request.after.start);
        assert_eq!(request.before.end_exclusive, request.after.start);
    }
}

#[tokio::test]
async fn change_air_quality_is_relative_to_baseline() {
    let engine = Arc::new(FakeEngine::constant(0.0).change(0.00004, 0.00003, -0.00001));
    let plan = plan("change", "air_quality", "2020-01-01", "2021-12-31");
    let engine_dyn: Arc<dyn ComputeEngine> = engine.clone();

    let result = ChangeExecutor::new(engine_dyn)
        .run(workflow(DataProduct::AirQuality).as_ref(), &plan, &nairobi_bbox())
        .await
        .unwrap();

    assert!((result.change_percent.unwrap() + 25.0).abs() < 1e-6);
}

#[tokio::test]
async fn change_with_zero_baseline_is_no_valid_data() {
    let engine = Arc::new(FakeEngine::constant(0.0).change(0.0, 0.00003, 0.00003));
    let plan = plan("change", "air_quality", "2020-01-01", "2021-12-31");
    let engine_dyn: Arc<dyn ComputeEngine> = engine.clone();

    let err = ChangeExecutor::new(engine_dyn)
        .run(workflow(DataProduct::AirQuality).as_ref(), &plan, &nairobi_bbox())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NoValidData { .. }));
}

#[tokio::test]
async fn change_missing_delta_and_remote_failure() {
    let engine = Arc::new(FakeEngine::constant(0.0).change_reduction(ChangeReduction::default()));
    let plan = plan("change", "temperature", "2020-01-01", "2021-12-31");
    let engine_dyn: Arc<dyn ComputeEngine> = engine.clone();
    let err = ChangeExecutor::new(engine_dyn)
        .run(workflow(DataProduct::Temperature).as_ref(), &plan, &nairobi_bbox())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NoValidData { .. }));

    let engine: Arc<dyn ComputeEngine> = Arc::new(FakeEngine::constant(0.0).failing_change());
    let err = ChangeExecutor::new(engine)
        .run(workflow(DataProduct::Temperature).as_ref(), &plan, &nairobi_bbox())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::RemoteCompute(_)));
}

#[tokio::test]
async fn single_date_map_renders_composite_only() {
    let engine = Arc::new(FakeEngine::constant(1.0));
    let plan = plan("single_date_map", "nightlights", "2023-01-01", "2023-12-31");
    let engine_dyn: Arc<dyn ComputeEngine> = engine.clone();

    let result = WorkflowExecutor::new(engine_dyn, ExecutorConfig::default())
        .execute(workflow(DataProduct::Nightlights).as_ref(), &plan, &nairobi_bbox())
        .await
        .unwrap();

    let map: MapLayer = result.map.unwrap();
    assert!(map.tile_url.contains("VIIRS"));
    assert!(result.time_series.is_none());
    assert!(result.statistics.is_none());
    assert!(engine.reduction_calls().is_empty());
    assert_eq!(engine.composite_calls().len(), 1);
}
