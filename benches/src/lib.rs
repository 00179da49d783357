//! Benchmark fixtures for mims.
//!
//! Generates deterministic candle series and pre-populated stores so the
//! criterion benchmarks measure the pipeline rather than data setup.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use mims_lib::prelude::*;

/// First bar of every generated series.
pub fn series_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Generates `count` consecutive 15-minute bars.
///
/// Prices follow a slow trend plus two sine waves, so every indicator sees
/// both gains and losses.
pub fn synthetic_bars(count: usize) -> Vec<Ohlcv> {
    let start = series_start();
    (0..count)
        .map(|i| {
            let x = i as f64;
            let open = 100.0 + x * 0.01 + (x / 24.0).sin() * 5.0 + (x / 3.0).sin();
            let close = open + (x / 5.0).cos() * 0.8;
            let high = open.max(close) + 0.5;
            let low = open.min(close) - 0.5;
            Ohlcv::new(
                start + TimeDelta::minutes(15 * i as i64),
                open,
                high,
                low,
                close,
                10.0 + (x / 7.0).sin().abs() * 90.0,
            )
        })
        .collect()
}

/// The indicator set most dashboards request.
pub fn dashboard_indicators() -> Vec<Indicator> {
    vec![
        Indicator::Sma { period: 20 },
        Indicator::Ema {
            period: 50,
            smoothing: 2,
        },
        Indicator::Rsi { period: 14 },
        Indicator::Macd {
            long_period: 26,
            short_period: 12,
            smoothing: 2,
        },
        Indicator::Bollinger {
            period: 20,
            deviation: 2,
        },
        Indicator::Fib { period: 96 },
        Indicator::Shift { period: 4 },
    ]
}

/// Builds a store holding `count` bars of `BTC/USD` at `COINBASE`.
pub async fn populated_store(count: usize) -> Result<(MemoryStore, Pair)> {
    let store = MemoryStore::default();
    let broker = store.register_broker("COINBASE").await?;
    let pair = store.register_pair("BTC", "USD", broker.id).await?;
    store.upsert_batch(pair.id, synthetic_bars(count)).await?;
    Ok((store, pair))
}
