//! Market-data queries over stored OHLCV candles.
//!
//! This is a facade crate that re-exports functionality from the mims
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use mims_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::default());
//!     let broker = store.register_broker("COINBASE").await?;
//!     let pair = store.register_pair("BTC", "USD", broker.id).await?;
//!     // ... ingest rows with `store.upsert(pair.id, bar)` ...
//!
//!     let orchestrator = QueryOrchestrator::from_store(store, OrchestratorConfig::default());
//!     let request: MarketDataRequest = serde_json::from_str(body)?;
//!     let response = orchestrator.handle(&request, chrono::Utc::now()).await?;
//!     JsonFormatter::new().write_response(&response, std::io::stdout())?;
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/mims-rs/mims/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use mims_types::*;

// Re-export the indicator pipeline
pub use mims_indicators::{CandleSeries, IndicatorEngine};

// Re-export repositories
#[cfg(feature = "store")]
pub use mims_store::{
    AvailabilityIndex, BucketAggregator, CandleSource, Ingest, MemoryStore, PairCandles,
    PairCoverage, PairDirectory, Snapshot, SnapshotFile, StoreConfig, StoreError, rollup,
};

// Re-export the query core
#[cfg(feature = "query")]
pub use mims_query::{
    AvailabilityTracker, Backfill, BackfillConfig, BackfillReport, CoveragePolicy,
    MarketDataRequest, MarketFeed, OrchestratorConfig, QueryOrchestrator, ValidatedQuery,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use mims_format::{CsvFormatter, FormatError, Formatter, JsonFormatter, JsonStyle, OutputFormat};

/// Prelude module for convenient imports.
///
/// ```
/// use mims_lib::prelude::*;
/// ```
pub mod prelude {
    pub use mims_types::{
        Annotation, BucketWidth, Candle, ErrorKind, Indicator, IndicatorKind, IndicatorSpec,
        Interval, IntervalSet, MimsError, Ohlcv, Pair, PairId, Parameter, QueryResponse, Result,
    };

    pub use mims_indicators::{CandleSeries, IndicatorEngine};

    #[cfg(feature = "store")]
    pub use mims_store::{
        AvailabilityIndex, CandleSource, Ingest, MemoryStore, PairDirectory, SnapshotFile,
        StoreConfig,
    };

    #[cfg(feature = "query")]
    pub use mims_query::{
        AvailabilityTracker, Backfill, CoveragePolicy, MarketDataRequest, OrchestratorConfig,
        QueryOrchestrator,
    };

    #[cfg(feature = "format")]
    pub use mims_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat};
}
