//! In-memory reference store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mims_types::{
    Broker, BrokerId, BucketWidth, Interval, IntervalSet, MimsError, Ohlcv, Pair, PairId, Result,
};
use tokio::sync::RwLock;

use crate::repository::{AvailabilityIndex, CandleSource, Ingest, PairDirectory};
use crate::rollup::rollup;
use crate::snapshot::{PairCandles, PairCoverage, Snapshot};
use crate::StoreConfig;

#[derive(Debug, Default)]
struct State {
    brokers: Vec<Broker>,
    pairs: Vec<Pair>,
    candles: BTreeMap<PairId, BTreeMap<DateTime<Utc>, Ohlcv>>,
    availability: BTreeMap<PairId, IntervalSet>,
}

/// Implements every repository trait over in-memory maps.
///
/// Readers share a [`RwLock`]; ingestion takes the write half, so upserts
/// are serialized.
#[derive(Debug, Default)]
pub struct MemoryStore {
    config: StoreConfig,
    state: RwLock<State>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            state: RwLock::default(),
        }
    }

    /// Rebuilds a store from a snapshot.
    ///
    /// Coverage is re-normalized and rows are re-keyed by timestamp, so a
    /// hand-edited snapshot cannot break the index invariants.
    #[must_use]
    pub fn from_snapshot(config: StoreConfig, snapshot: Snapshot) -> Self {
        let candles = snapshot
            .candles
            .into_iter()
            .map(|entry| {
                let rows: BTreeMap<_, _> = entry.bars.into_iter().map(|bar| (bar.timestamp, bar)).collect();
                (entry.pair_id, rows)
            })
            .collect();
        let availability = snapshot
            .availability
            .into_iter()
            .map(|entry| (entry.pair_id, entry.ranges.iter().copied().collect()))
            .collect();

        Self {
            config,
            state: RwLock::new(State {
                brokers: snapshot.brokers,
                pairs: snapshot.pairs,
                candles,
                availability,
            }),
        }
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Copies the current contents into a snapshot.
    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.read().await;
        Snapshot {
            brokers: state.brokers.clone(),
            pairs: state.pairs.clone(),
            candles: state
                .candles
                .iter()
                .map(|(pair_id, rows)| PairCandles {
                    pair_id: *pair_id,
                    bars: rows.values().copied().collect(),
                })
                .collect(),
            availability: state
                .availability
                .iter()
                .map(|(pair_id, ranges)| PairCoverage {
                    pair_id: *pair_id,
                    ranges: ranges.clone(),
                })
                .collect(),
        }
    }

    /// Returns the number of stored rows for `pair_id`.
    pub async fn row_count(&self, pair_id: PairId) -> usize {
        self.state
            .read()
            .await
            .candles
            .get(&pair_id)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl PairDirectory for MemoryStore {
    async fn resolve(&self, base: &str, quote: &str, broker: &str) -> Result<Pair> {
        let state = self.state.read().await;
        let found = state
            .brokers
            .iter()
            .find(|b| b.name == broker)
            .and_then(|b| {
                state
                    .pairs
                    .iter()
                    .find(|p| p.broker_id == b.id && p.base == base && p.quote == quote)
            });

        found
            .cloned()
            .ok_or_else(|| MimsError::not_found(format!("pair {base}/{quote} at broker {broker}")))
    }

    async fn brokers(&self) -> Result<Vec<Broker>> {
        Ok(self.state.read().await.brokers.clone())
    }

    async fn pairs(&self) -> Result<Vec<Pair>> {
        Ok(self.state.read().await.pairs.clone())
    }

    async fn register_broker(&self, name: &str) -> Result<Broker> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.brokers.iter().find(|b| b.name == name) {
            return Ok(existing.clone());
        }

        let broker = Broker::new(name);
        tracing::info!(broker = %broker.name, id = %broker.id, "registered broker");
        state.brokers.push(broker.clone());
        Ok(broker)
    }

    async fn register_pair(&self, base: &str, quote: &str, broker_id: BrokerId) -> Result<Pair> {
        let mut state = self.state.write().await;
        if !state.brokers.iter().any(|b| b.id == broker_id) {
            return Err(MimsError::not_found(format!("broker {broker_id}")));
        }
        if let Some(existing) = state
            .pairs
            .iter()
            .find(|p| p.broker_id == broker_id && p.base == base && p.quote == quote)
        {
            return Ok(existing.clone());
        }

        let pair = Pair::new(base, quote, broker_id);
        tracing::info!(symbol = %pair.symbol(), id = %pair.id, "registered pair");
        state.pairs.push(pair.clone());
        Ok(pair)
    }
}

#[async_trait]
impl AvailabilityIndex for MemoryStore {
    async fn known_ranges(&self, pair_id: PairId) -> Result<IntervalSet> {
        Ok(self
            .state
            .read()
            .await
            .availability
            .get(&pair_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl CandleSource for MemoryStore {
    async fn fetch(
        &self,
        pair_id: PairId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        width: BucketWidth,
    ) -> Result<Vec<Ohlcv>> {
        if start > end {
            return Ok(Vec::new());
        }

        let state = self.state.read().await;
        let Some(rows) = state.candles.get(&pair_id) else {
            return Ok(Vec::new());
        };

        let bars = rollup(rows.range(start..=end).map(|(_, row)| row), width);
        tracing::debug!(pair_id = %pair_id, %width, bars = bars.len(), "fetched candles");
        Ok(bars)
    }
}

#[async_trait]
impl Ingest for MemoryStore {
    async fn upsert(&self, pair_id: PairId, bar: Ohlcv) -> Result<()> {
        let end = self
            .config
            .base_resolution
            .as_delta()
            .and_then(|d| bar.timestamp.checked_add_signed(d))
            .ok_or_else(|| {
                MimsError::Store(format!(
                    "row at {} plus base resolution {} is out of range",
                    bar.timestamp, self.config.base_resolution
                ))
            })?;
        let covered = Interval::new(bar.timestamp, end)?;

        let mut state = self.state.write().await;
        state
            .candles
            .entry(pair_id)
            .or_default()
            .insert(bar.timestamp, bar);
        let ranges = state.availability.entry(pair_id).or_default();
        *ranges = ranges.with(covered);
        Ok(())
    }

    async fn record_coverage(&self, pair_id: PairId, range: Interval) -> Result<()> {
        let mut state = self.state.write().await;
        let ranges = state.availability.entry(pair_id).or_default();
        *ranges = ranges.with(range);
        tracing::debug!(pair_id = %pair_id, %range, "recorded coverage");
        Ok(())
    }
}
