//! Repositories for the mims market-data service.
//!
//! - [`PairDirectory`], [`AvailabilityIndex`], [`CandleSource`], [`Ingest`] - Repository traits
//! - [`MemoryStore`] - In-memory implementation of every repository
//! - [`BucketAggregator`] - Streaming rollup of rows into wider buckets
//! - [`SnapshotFile`] - JSON persistence of a [`MemoryStore`]

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/mims-rs/mims/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod memory;
mod repository;
mod rollup;
mod snapshot;

pub use config::StoreConfig;
pub use memory::MemoryStore;
pub use repository::{AvailabilityIndex, CandleSource, Ingest, PairDirectory};
pub use rollup::{BucketAggregator, rollup};
pub use snapshot::{PairCandles, PairCoverage, Snapshot, SnapshotFile, StoreError};
