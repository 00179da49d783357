//! Gap filling from an upstream market feed.

use std::sync::Arc;

use async_trait::async_trait;
use mims_store::{AvailabilityIndex, Ingest};
use mims_types::{Interval, MimsError, Ohlcv, Pair, Result};
use serde::Serialize;

use crate::{AvailabilityTracker, BackfillConfig};

/// An upstream source of historical base-resolution rows.
#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// Returns rows of `pair` stamped within `interval`.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    async fn fetch(&self, pair: &Pair, interval: Interval) -> Result<Vec<Ohlcv>>;
}

/// What a [`Backfill::fill`] call did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    /// Gaps that were fetched and are now covered.
    pub gaps: Vec<Interval>,
    /// Rows written across all gaps.
    pub rows: usize,
}

impl BackfillReport {
    /// Returns true if the range was already covered.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.gaps.is_empty()
    }
}

/// Fills a pair's coverage gaps from a [`MarketFeed`].
#[derive(Clone)]
pub struct Backfill {
    feed: Arc<dyn MarketFeed>,
    availability: Arc<dyn AvailabilityIndex>,
    ingest: Arc<dyn Ingest>,
    config: BackfillConfig,
}

impl std::fmt::Debug for Backfill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backfill")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Backfill {
    /// Creates a backfill over separate repositories.
    #[must_use]
    pub fn new(
        feed: Arc<dyn MarketFeed>,
        availability: Arc<dyn AvailabilityIndex>,
        ingest: Arc<dyn Ingest>,
        config: BackfillConfig,
    ) -> Self {
        Self {
            feed,
            availability,
            ingest,
            config,
        }
    }

    /// Creates a backfill writing into one store.
    #[must_use]
    pub fn from_store<S>(feed: Arc<dyn MarketFeed>, store: Arc<S>, config: BackfillConfig) -> Self
    where
        S: AvailabilityIndex + Ingest + 'static,
    {
        Self::new(feed, store.clone(), store, config)
    }

    /// Fetches every part of `requested` the pair lacks, upserts the rows and
    /// marks each gap as covered.
    ///
    /// A gap for which the feed returns no rows is still recorded as covered.
    /// Rows outside the gap they were fetched for are discarded.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamUnavailable` if a feed call fails or exceeds the
    /// configured timeout. Gaps filled before the failure stay filled.
    #[tracing::instrument(skip_all, fields(pair = %pair.symbol(), %requested))]
    pub async fn fill(&self, pair: &Pair, requested: Interval) -> Result<BackfillReport> {
        let known = self.availability.known_ranges(pair.id).await?;
        let gaps = AvailabilityTracker::gaps(&requested, known.as_slice());

        let mut rows = 0;
        for gap in &gaps {
            let fetched = tokio::time::timeout(self.config.timeout, self.feed.fetch(pair, *gap))
                .await
                .map_err(|_| {
                    MimsError::UpstreamUnavailable(format!(
                        "feed call for {gap} exceeded {}ms",
                        self.config.timeout.as_millis()
                    ))
                })?
                .map_err(|e| match e {
                    MimsError::UpstreamUnavailable(_) => e,
                    other => MimsError::UpstreamUnavailable(other.to_string()),
                })?;

            let inside: Vec<Ohlcv> = fetched
                .into_iter()
                .filter(|bar| gap.contains(bar.timestamp))
                .collect();
            rows += self.ingest.upsert_batch(pair.id, inside).await?;
            self.ingest.record_coverage(pair.id, *gap).await?;
            tracing::debug!(%gap, rows, "filled gap");
        }

        tracing::info!(gaps = gaps.len(), rows, "backfill complete");
        Ok(BackfillReport { gaps, rows })
    }
}
