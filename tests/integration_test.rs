//! Integration Tests - Pipeline and Scheduler with Mock Ports
//!
//! Exercises tick outcomes, storage-failure swallowing, metrics, and
//! scheduling cadence. Uses mockall for the port traits and tokio's
//! paused clock for interval timing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use mockall::mock;
use serde_json::{json, Value};
use tokio::sync::broadcast;

use bitcoin_price_pipeline::adapters::metrics::MetricsRegistry;
use bitcoin_price_pipeline::domain::{Clock, PriceRecord, ValidationError};
use bitcoin_price_pipeline::ports::metrics::{
    OUTCOME_COMPLETED, OUTCOME_FETCH_FAILED, OUTCOME_INVALID,
};
use bitcoin_price_pipeline::ports::{PriceRepository, PriceSource, TickMetrics};
use bitcoin_price_pipeline::usecases::{PricePipeline, Scheduler, TickOutcome};

// ---- Mock Definitions ----

mock! {
    pub Source {}

    #[async_trait::async_trait]
    impl PriceSource for Source {
        async fn fetch(&self) -> Option<Value>;
    }
}

mock! {
    pub Repo {}

    #[async_trait::async_trait]
    impl PriceRepository for Repo {
        async fn upsert(&self, record: &PriceRecord) -> anyhow::Result<()>;
        async fn load_all(&self) -> anyhow::Result<Vec<PriceRecord>>;
        async fn latest(&self) -> anyhow::Result<Option<PriceRecord>>;
        async fn count(&self) -> anyhow::Result<u64>;
        async fn is_healthy(&self) -> bool;
    }
}

mock! {
    pub Metrics {}

    impl TickMetrics for Metrics {
        fn observe_fetch_latency(&self, seconds: f64);
        fn record_tick(&self, outcome: &str);
        fn record_stored_price(&self, price_usd: f64);
        fn record_store_error(&self);
    }
}

struct FixedClock(NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

fn tick_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 14)
        .and_then(|d| d.and_hms_opt(12, 5, 0))
        .unwrap()
}

fn source_returning(data: Option<Value>) -> MockSource {
    let mut source = MockSource::new();
    source.expect_fetch().times(1).returning(move || data.clone());
    source
}

fn pipeline<S: PriceSource, R: PriceRepository>(
    source: S,
    repo: R,
) -> (PricePipeline<S, R>, Arc<MetricsRegistry>) {
    let metrics = Arc::new(MetricsRegistry::new().unwrap());
    let pipeline = PricePipeline::new(
        Arc::new(source),
        Arc::new(repo),
        Arc::new(FixedClock(tick_time())),
        metrics.clone(),
    );
    (pipeline, metrics)
}

// ---- Pipeline Tests ----

#[tokio::test]
async fn test_valid_quote_is_saved() {
    let mut repo = MockRepo::new();
    repo.expect_upsert()
        .withf(|r| {
            r.timestamp == "2024-03-14T12:05:00.000000" && (r.price_usd - 50000.0).abs() < f64::EPSILON
        })
        .times(1)
        .returning(|_| Ok(()));

    let (pipeline, metrics) = pipeline(
        source_returning(Some(json!({"bitcoin": {"usd": 50000.0}}))),
        repo,
    );

    let outcome = pipeline.run_once().await;
    assert_eq!(
        outcome,
        TickOutcome::Completed {
            record: PriceRecord {
                timestamp: "2024-03-14T12:05:00.000000".to_string(),
                price_usd: 50000.0,
            },
            persisted: true,
        }
    );
    assert_eq!(metrics.ticks(OUTCOME_COMPLETED), 1);
    assert!((metrics.last_price_usd.get() - 50000.0).abs() < f64::EPSILON);
    assert_eq!(metrics.fetch_latency_seconds.get_sample_count(), 1);
}

#[tokio::test]
async fn test_failed_fetch_aborts_without_write() {
    let mut repo = MockRepo::new();
    repo.expect_upsert().never();

    let (pipeline, metrics) = pipeline(source_returning(None), repo);

    let outcome = pipeline.run_once().await;
    assert_eq!(outcome, TickOutcome::Aborted(ValidationError::NoData));
    assert!(!outcome.is_completed());
    assert_eq!(metrics.ticks(OUTCOME_FETCH_FAILED), 1);
    assert_eq!(metrics.ticks(OUTCOME_COMPLETED), 0);
}

#[tokio::test]
async fn test_wrong_asset_aborts_with_reason() {
    let mut repo = MockRepo::new();
    repo.expect_upsert().never();

    let (pipeline, metrics) = pipeline(
        source_returning(Some(json!({"ethereum": {"usd": 3000}}))),
        repo,
    );

    match pipeline.run_once().await {
        TickOutcome::Aborted(reason) => assert_eq!(reason.to_string(), "Missing 'bitcoin' key"),
        other => panic!("expected abort, got {other:?}"),
    }
    assert_eq!(metrics.ticks(OUTCOME_INVALID), 1);
}

#[tokio::test]
async fn test_non_numeric_price_aborts() {
    let mut repo = MockRepo::new();
    repo.expect_upsert().never();

    let (pipeline, _metrics) = pipeline(
        source_returning(Some(json!({"bitcoin": {"usd": "not_a_number"}}))),
        repo,
    );

    assert_eq!(
        pipeline.run_once().await,
        TickOutcome::Aborted(ValidationError::UsdNotANumber)
    );
}

#[tokio::test]
async fn test_storage_failure_is_swallowed() {
    let mut repo = MockRepo::new();
    repo.expect_upsert()
        .times(1)
        .returning(|_| Err(anyhow::anyhow!("disk I/O error")));

    let (pipeline, metrics) = pipeline(
        source_returning(Some(json!({"bitcoin": {"usd": 61000}}))),
        repo,
    );

    match pipeline.run_once().await {
        TickOutcome::Completed { record, persisted } => {
            assert!(!persisted);
            assert!((record.price_usd - 61000.0).abs() < f64::EPSILON);
        }
        other => panic!("expected completion, got {other:?}"),
    }
    assert_eq!(metrics.store_errors_total.get(), 1);
    assert_eq!(metrics.ticks(OUTCOME_COMPLETED), 1);
    assert!(metrics.last_price_usd.get().abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_pipeline_reports_through_metrics_port() {
    let mut repo = MockRepo::new();
    repo.expect_upsert().never();

    let mut metrics = MockMetrics::new();
    metrics.expect_observe_fetch_latency().times(1).return_const(());
    metrics
        .expect_record_tick()
        .withf(|outcome| outcome.to_string() == OUTCOME_INVALID)
        .times(1)
        .return_const(());
    metrics.expect_record_stored_price().never();
    metrics.expect_record_store_error().never();

    let pipeline = PricePipeline::new(
        Arc::new(source_returning(Some(json!({"bitcoin": 42})))),
        Arc::new(repo),
        Arc::new(FixedClock(tick_time())),
        Arc::new(metrics),
    );

    assert_eq!(
        pipeline.run_once().await,
        TickOutcome::Aborted(ValidationError::BitcoinNotAnObject)
    );
}

// ---- Scheduler Tests ----

#[tokio::test(start_paused = true)]
async fn test_scheduler_runs_immediately_then_every_interval() {
    let mut source = MockSource::new();
    source.expect_fetch().times(3).returning(|| None);
    let mut repo = MockRepo::new();
    repo.expect_upsert().never();

    let (pipeline, metrics) = pipeline(source, repo);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let scheduler = Scheduler::new(Duration::from_secs(300));

    let handle = tokio::spawn(async move { scheduler.run(&pipeline, shutdown_rx).await });

    // Ticks at t=0, 300 and 600.
    tokio::time::sleep(Duration::from_secs(601)).await;
    shutdown_tx.send(()).unwrap();

    assert_eq!(handle.await.unwrap(), 3);
    assert_eq!(metrics.ticks(OUTCOME_FETCH_FAILED), 3);
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_stops_when_sender_dropped() {
    let mut source = MockSource::new();
    source.expect_fetch().times(1).returning(|| None);
    let (pipeline, _metrics) = pipeline(source, MockRepo::new());
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);

    let handle = tokio::spawn(async move { Scheduler::default().run(&pipeline, shutdown_rx).await });

    tokio::time::sleep(Duration::from_secs(1)).await;
    drop(shutdown_tx);

    assert_eq!(handle.await.unwrap(), 1);
}

/// Source whose fetch outlasts the scheduler period.
struct SlowSource {
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: Arc<AtomicUsize>,
}

#[async_trait]
impl PriceSource for SlowSource {
    async fn fetch(&self) -> Option<Value> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        None
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_ticks_never_overlap() {
    let max_in_flight = Arc::new(AtomicUsize::new(0));
    let source = SlowSource {
        delay: Duration::from_secs(400),
        in_flight: AtomicUsize::new(0),
        max_in_flight: Arc::clone(&max_in_flight),
    };
    let mut repo = MockRepo::new();
    repo.expect_upsert().never();

    let (pipeline, _metrics) = pipeline(source, repo);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let scheduler = Scheduler::new(Duration::from_secs(300));

    let handle = tokio::spawn(async move { scheduler.run(&pipeline, shutdown_rx).await });

    // Ticks start at 0, 400 and 800; the third is in flight at t=1000
    // and finishes before shutdown is observed.
    tokio::time::sleep(Duration::from_secs(1000)).await;
    shutdown_tx.send(()).unwrap();

    assert_eq!(handle.await.unwrap(), 3);
    assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
}
