use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use approx::assert_relative_eq;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use mims_query::{Backfill, BackfillConfig, MarketFeed, OrchestratorConfig, QueryOrchestrator};
use mims_store::{AvailabilityIndex, Ingest, MemoryStore, PairDirectory};
use mims_types::{BucketWidth, ErrorKind, Indicator, Interval, MimsError, Ohlcv, Pair};

fn at(i: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap() + TimeDelta::minutes(15 * i)
}

/// Emits one row per quarter hour of each requested interval.
#[derive(Default)]
struct QuarterHourFeed {
    calls: AtomicUsize,
}

#[async_trait]
impl MarketFeed for QuarterHourFeed {
    async fn fetch(&self, _pair: &Pair, interval: Interval) -> mims_types::Result<Vec<Ohlcv>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = Vec::new();
        let mut ts = interval.start() - TimeDelta::minutes(15);
        while ts <= interval.end() {
            rows.push(Ohlcv::flat(ts, 42.0, 1.0));
            ts += TimeDelta::minutes(15);
        }
        Ok(rows)
    }
}

struct BrokenFeed;

#[async_trait]
impl MarketFeed for BrokenFeed {
    async fn fetch(&self, _pair: &Pair, _interval: Interval) -> mims_types::Result<Vec<Ohlcv>> {
        Err(MimsError::Store("connection reset".into()))
    }
}

struct StalledFeed;

#[async_trait]
impl MarketFeed for StalledFeed {
    async fn fetch(&self, _pair: &Pair, _interval: Interval) -> mims_types::Result<Vec<Ohlcv>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }
}

async fn store_with_pair() -> (Arc<MemoryStore>, Pair) {
    let store = Arc::new(MemoryStore::default());
    let broker = store.register_broker("COINBASE").await.unwrap();
    let pair = store.register_pair("BTC", "USD", broker.id).await.unwrap();
    (store, pair)
}

#[tokio::test]
async fn test_fill_fetches_only_gaps() {
    let (store, pair) = store_with_pair().await;
    store
        .record_coverage(pair.id, Interval::new(at(4), at(8)).unwrap())
        .await
        .unwrap();

    let feed = Arc::new(QuarterHourFeed::default());
    let backfill = Backfill::from_store(feed.clone(), store.clone(), BackfillConfig::default());
    let requested = Interval::new(at(0), at(12)).unwrap();

    let report = backfill.fill(&pair, requested).await.unwrap();
    assert_eq!(
        report.gaps,
        vec![
            Interval::new(at(0), at(4)).unwrap(),
            Interval::new(at(8), at(12)).unwrap(),
        ]
    );
    // rows outside each gap are dropped, shared endpoints are kept
    assert_eq!(report.rows, 10);
    assert_eq!(feed.calls.load(Ordering::SeqCst), 2);

    let known = store.known_ranges(pair.id).await.unwrap();
    assert!(known.covers(&requested));

    let again = backfill.fill(&pair, requested).await.unwrap();
    assert!(again.is_noop());
    assert_eq!(feed.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_empty_feed_still_records_coverage() {
    let (store, pair) = store_with_pair().await;
    struct EmptyFeed;
    #[async_trait]
    impl MarketFeed for EmptyFeed {
        async fn fetch(&self, _: &Pair, _: Interval) -> mims_types::Result<Vec<Ohlcv>> {
            Ok(Vec::new())
        }
    }

    let backfill = Backfill::from_store(Arc::new(EmptyFeed), store.clone(), BackfillConfig::default());
    let requested = Interval::new(at(0), at(3)).unwrap();
    let report = backfill.fill(&pair, requested).await.unwrap();
    assert_eq!(report.rows, 0);
    assert!(store.known_ranges(pair.id).await.unwrap().covers(&requested));
}

#[tokio::test]
async fn test_feed_failure_is_upstream_unavailable() {
    let (store, pair) = store_with_pair().await;
    let backfill = Backfill::from_store(Arc::new(BrokenFeed), store.clone(), BackfillConfig::default());

    let err = backfill
        .fill(&pair, Interval::new(at(0), at(4)).unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    assert!(err.to_string().contains("connection reset"));
    assert!(store.known_ranges(pair.id).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_feed_timeout_is_upstream_unavailable() {
    let (store, pair) = store_with_pair().await;
    let config = BackfillConfig {
        timeout: Duration::from_millis(200),
    };
    let backfill = Backfill::from_store(Arc::new(StalledFeed), store, config);

    let err = backfill
        .fill(&pair, Interval::new(at(0), at(4)).unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind().http_status(), 503);
}

#[tokio::test]
async fn test_backfill_then_retry_query() {
    let (store, pair) = store_with_pair().await;
    let orchestrator = QueryOrchestrator::from_store(store.clone(), OrchestratorConfig::default());
    let range = Interval::new(at(20), at(40)).unwrap();
    let indicators = [Indicator::Ema {
        period: 8,
        smoothing: 2,
    }];

    let err = orchestrator
        .execute(pair.id, range, BucketWidth::FIFTEEN_MINUTES, &indicators)
        .await
        .unwrap_err();
    let MimsError::DataUnavailable { requested, .. } = err else {
        panic!("expected DataUnavailable, got {err:?}");
    };

    let backfill = Backfill::from_store(
        Arc::new(QuarterHourFeed::default()),
        store.clone(),
        BackfillConfig::default(),
    );
    backfill.fill(&pair, requested).await.unwrap();

    let response = orchestrator
        .execute(pair.id, range, BucketWidth::FIFTEEN_MINUTES, &indicators)
        .await
        .unwrap();
    assert_eq!(response.bars.len(), 20);
    for bar in &response.bars {
        let ema = bar.annotation("ema_8_2").unwrap().as_value().unwrap();
        assert_relative_eq!(ema, 42.0, epsilon = 1e-9);
    }
    assert!(store.resolve("BTC", "USD", "COINBASE").await.is_ok());
}
