//! Query core for the mims market-data service.
//!
//! - [`AvailabilityTracker`] - Coverage test and gap computation
//! - [`MarketDataRequest`] / [`ValidatedQuery`] - Wire request and its validated form
//! - [`QueryOrchestrator`] - Lookback, coverage, fetch, indicators, trim
//! - [`Backfill`] - Fills coverage gaps from a [`MarketFeed`]

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/mims-rs/mims/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod backfill;
mod config;
mod coverage;
mod orchestrator;
mod request;

pub use backfill::{Backfill, BackfillReport, MarketFeed};
pub use config::{BackfillConfig, OrchestratorConfig};
pub use coverage::{AvailabilityTracker, CoveragePolicy};
pub use orchestrator::QueryOrchestrator;
pub use request::{MarketDataRequest, ValidatedQuery};
