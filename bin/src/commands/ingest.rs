//! Ingest command implementation.
//!
//! Streams a candle CSV into the store, registering pairs on first sight,
//! then saves the snapshot.

use crate::display::{open_store, parse_symbol};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use csv_async::{AsyncReaderBuilder, Trim};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use mims_lib::prelude::*;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Timestamp layout of the CSV `timestamp` column (UTC).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One CSV record.
#[derive(Debug, Deserialize)]
struct CsvRow {
    symbol: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    timestamp: String,
}

impl CsvRow {
    /// Splits the symbol and builds the bar, rejecting inconsistent prices.
    fn into_bar(self) -> Result<(String, Ohlcv)> {
        parse_symbol(&self.symbol)?;
        let timestamp = NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT)
            .with_context(|| format!("Invalid timestamp: {}", self.timestamp))?
            .and_utc();

        let bar = Ohlcv::new(
            timestamp, self.open, self.high, self.low, self.close, self.volume,
        );
        anyhow::ensure!(bar.is_consistent(), "Inconsistent prices at {timestamp}");
        Ok((self.symbol, bar))
    }
}

/// Import candles from `path` under `broker`.
pub(crate) async fn ingest(
    snapshot: &SnapshotFile,
    path: &Path,
    broker: &str,
    quiet: bool,
) -> Result<()> {
    let store = open_store(snapshot)?;
    let broker = store.register_broker(broker).await?;

    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = AsyncReaderBuilder::new()
        .trim(Trim::All)
        .create_deserializer(file);
    let mut records = reader.deserialize::<CsvRow>();

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} rows {msg}")?,
        );
        pb.set_message(path.display().to_string());
        pb
    };

    let mut pairs: HashMap<String, PairId> = HashMap::new();
    let mut batches: BTreeMap<PairId, Vec<Ohlcv>> = BTreeMap::new();
    let mut skipped = 0u64;
    // Line 1 is the header.
    let mut line = 1u64;

    while let Some(record) = records.next().await {
        line += 1;
        progress.inc(1);

        let parsed = record
            .context("Malformed record")
            .and_then(CsvRow::into_bar);
        let (symbol, bar) = match parsed {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(line, error = %format!("{e:#}"), "skipping row");
                skipped += 1;
                continue;
            }
        };

        let pair_id = match pairs.get(&symbol) {
            Some(id) => *id,
            None => {
                let (base, quote) = parse_symbol(&symbol)?;
                let pair = store.register_pair(base, quote, broker.id).await?;
                pairs.insert(symbol, pair.id);
                pair.id
            }
        };
        batches.entry(pair_id).or_default().push(bar);
    }

    let mut written = 0;
    for (pair_id, bars) in batches {
        written += store.upsert_batch(pair_id, bars).await?;
    }

    let finish_msg = if skipped > 0 {
        format!("Ingested {written} rows ({skipped} malformed rows skipped)")
    } else {
        format!("Ingested {written} rows")
    };
    progress.finish_with_message(finish_msg);

    snapshot
        .save(&store.snapshot().await)
        .with_context(|| format!("Failed to save store to {}", snapshot.path().display()))?;

    if !quiet {
        println!(
            "{written} rows for {} pairs at {} written to: {}",
            pairs.len(),
            broker.name,
            snapshot.path().display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(symbol: &str, low: f64, timestamp: &str) -> CsvRow {
        CsvRow {
            symbol: symbol.to_string(),
            open: 10.0,
            high: 12.0,
            low,
            close: 11.0,
            volume: 3.0,
            timestamp: timestamp.to_string(),
        }
    }

    #[test]
    fn test_into_bar() {
        let (symbol, bar) = row("BTC/USD", 9.0, "2024-01-01 00:15:00").into_bar().unwrap();
        assert_eq!(symbol, "BTC/USD");
        assert_eq!(bar.timestamp.to_rfc3339(), "2024-01-01T00:15:00+00:00");
        assert_eq!(bar.close, 11.0);
    }

    #[test]
    fn test_into_bar_rejects_malformed() {
        assert!(row("BTCUSD", 9.0, "2024-01-01 00:15:00").into_bar().is_err());
        assert!(row("BTC/USD", 9.0, "2024-01-01T00:15:00Z").into_bar().is_err());
        assert!(row("BTC/USD", 10.5, "2024-01-01 00:15:00").into_bar().is_err());
    }
}
