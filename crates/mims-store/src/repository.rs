//! Repository traits.
//!
//! The query core only talks to storage through these seams, so tests can
//! substitute fakes and deployments can plug in a real time-series database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mims_types::{Broker, BrokerId, BucketWidth, Interval, IntervalSet, Ohlcv, Pair, PairId, Result};

/// Broker and pair registry.
#[async_trait]
pub trait PairDirectory: Send + Sync {
    /// Resolves a `base/quote` pair quoted by `broker`.
    ///
    /// Matching is case-sensitive on every component.
    ///
    /// # Errors
    ///
    /// Returns [`MimsError::NotFound`](mims_types::MimsError::NotFound) if the
    /// triple does not resolve.
    async fn resolve(&self, base: &str, quote: &str, broker: &str) -> Result<Pair>;

    /// Returns every broker.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be read.
    async fn brokers(&self) -> Result<Vec<Broker>>;

    /// Returns every pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be read.
    async fn pairs(&self) -> Result<Vec<Pair>>;

    /// Registers a broker, returning the existing row if the name is taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be written.
    async fn register_broker(&self, name: &str) -> Result<Broker>;

    /// Registers a pair under `broker_id`, returning the existing row if present.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the broker does not exist.
    async fn register_pair(&self, base: &str, quote: &str, broker_id: BrokerId) -> Result<Pair>;
}

/// Per-pair index of ingested time ranges.
#[async_trait]
pub trait AvailabilityIndex: Send + Sync {
    /// Returns the known ranges of `pair_id`, sorted and disjoint.
    ///
    /// A pair with no data yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be read.
    async fn known_ranges(&self, pair_id: PairId) -> Result<IntervalSet>;
}

/// Bucketed candle reads.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Returns bars of `width` for rows stamped within `[start, end]`.
    ///
    /// Output is ascending with one bar per bucket containing at least one
    /// row; empty buckets are not synthesized.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn fetch(
        &self,
        pair_id: PairId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        width: BucketWidth,
    ) -> Result<Vec<Ohlcv>>;
}

/// Candle writes.
#[async_trait]
pub trait Ingest: Send + Sync {
    /// Inserts or replaces the row keyed by `(pair_id, bar.timestamp)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    async fn upsert(&self, pair_id: PairId, bar: Ohlcv) -> Result<()>;

    /// Marks `range` as ingested for `pair_id`, whether or not rows exist in it.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be written.
    async fn record_coverage(&self, pair_id: PairId, range: Interval) -> Result<()>;

    /// Upserts every bar in order, returning how many were written.
    ///
    /// # Errors
    ///
    /// Stops at the first failing upsert.
    async fn upsert_batch(&self, pair_id: PairId, bars: Vec<Ohlcv>) -> Result<usize> {
        let count = bars.len();
        for bar in bars {
            self.upsert(pair_id, bar).await?;
        }
        tracing::info!(pair_id = %pair_id, rows = count, "ingested batch");
        Ok(count)
    }
}
