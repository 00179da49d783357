//! The read path: lookback, coverage, fetch, indicators, trim.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mims_indicators::{CandleSeries, IndicatorEngine};
use mims_store::{AvailabilityIndex, CandleSource, PairDirectory};
use mims_types::{BucketWidth, Indicator, Interval, MimsError, Ohlcv, PairId, QueryResponse, Result};

use crate::request::lookback;
use crate::{AvailabilityTracker, MarketDataRequest, OrchestratorConfig, ValidatedQuery};

/// Answers market-data queries over explicit repositories.
///
/// Holds no per-request state: every query builds, annotates and discards
/// its own [`CandleSeries`].
#[derive(Clone)]
pub struct QueryOrchestrator {
    directory: Arc<dyn PairDirectory>,
    availability: Arc<dyn AvailabilityIndex>,
    candles: Arc<dyn CandleSource>,
    engine: IndicatorEngine,
    tracker: AvailabilityTracker,
    config: OrchestratorConfig,
}

impl std::fmt::Debug for QueryOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryOrchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl QueryOrchestrator {
    /// Creates an orchestrator over separate repositories.
    #[must_use]
    pub fn new(
        directory: Arc<dyn PairDirectory>,
        availability: Arc<dyn AvailabilityIndex>,
        candles: Arc<dyn CandleSource>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            directory,
            availability,
            candles,
            engine: IndicatorEngine::new(),
            tracker: AvailabilityTracker::new(config.coverage),
            config,
        }
    }

    /// Creates an orchestrator over one store implementing every repository.
    #[must_use]
    pub fn from_store<S>(store: Arc<S>, config: OrchestratorConfig) -> Self
    where
        S: PairDirectory + AvailabilityIndex + CandleSource + 'static,
    {
        Self::new(store.clone(), store.clone(), store, config)
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Validates `request` against `now`, then runs it.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a malformed request, plus every error of
    /// [`QueryOrchestrator::run`].
    pub async fn handle(
        &self,
        request: &MarketDataRequest,
        now: DateTime<Utc>,
    ) -> Result<QueryResponse> {
        let query = request.validate(now)?;
        self.run(&query).await
    }

    /// Resolves the pair of `query`, then executes it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the pair does not resolve, plus every error of
    /// [`QueryOrchestrator::execute`].
    pub async fn run(&self, query: &ValidatedQuery) -> Result<QueryResponse> {
        let pair = self
            .directory
            .resolve(&query.base, &query.quote, &query.broker)
            .await?;
        self.execute(pair.id, query.range, query.width, &query.indicators)
            .await
    }

    /// Executes a query for a resolved pair.
    ///
    /// The start is widened by the indicator warm-up before the coverage
    /// check and fetch; bars stamped at or before the requested start are
    /// dropped afterwards, and only requested indicator keys are kept.
    ///
    /// # Errors
    ///
    /// Returns `DataUnavailable` (carrying the widened range) if ingested
    /// history does not cover it, or a store error if a repository fails or
    /// the fetch exceeds the configured deadline.
    #[tracing::instrument(
        skip_all,
        fields(%pair_id, %range, %width, indicators = indicators.len())
    )]
    pub async fn execute(
        &self,
        pair_id: PairId,
        range: Interval,
        width: BucketWidth,
        indicators: &[Indicator],
    ) -> Result<QueryResponse> {
        let warm_up = lookback(width, indicators);
        let Some(widened_start) = warm_up.and_then(|w| range.start().checked_sub_signed(w)) else {
            // No ingested history can reach back past the earliest instant.
            tracing::debug!("indicator warm-up reaches past the representable range");
            return Err(MimsError::DataUnavailable {
                pair_id,
                requested: Interval::new(DateTime::<Utc>::MIN_UTC, range.end())?,
            });
        };
        let widened = Interval::new(widened_start, range.end())?;
        if widened_start < range.start() {
            tracing::debug!(%widened, "widened start for indicator warm-up");
        }

        let known = self.availability.known_ranges(pair_id).await?;
        if !self.tracker.is_covered(&widened, known.as_slice()) {
            tracing::debug!(known = known.len(), "requested range not covered");
            return Err(MimsError::DataUnavailable {
                pair_id,
                requested: widened,
            });
        }

        let bars = self.fetch(pair_id, &widened, width).await?;
        let mut series = CandleSeries::from_bars(bars);
        let keys = self.engine.compute_all(&mut series, indicators);
        series.retain_keys(&keys);

        if !indicators.is_empty() {
            let dropped = series.trim_through(range.start());
            tracing::debug!(dropped, kept = series.len(), "trimmed warm-up bars");
        }

        let (bars, registrations) = series.into_parts();
        Ok(QueryResponse {
            bars,
            indicators: registrations,
        })
    }

    async fn fetch(&self, pair_id: PairId, range: &Interval, width: BucketWidth) -> Result<Vec<Ohlcv>> {
        let fetch = self.candles.fetch(pair_id, range.start(), range.end(), width);
        match self.config.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, fetch).await.map_err(|_| {
                MimsError::Store(format!("candle fetch exceeded {}ms", limit.as_millis()))
            })?,
            None => fetch.await,
        }
    }
}
