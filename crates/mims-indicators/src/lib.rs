//! Technical indicators over candle series.
//!
//! - [`CandleSeries`] - The per-query candle buffer indicators write into
//! - [`IndicatorEngine`] - Evaluates indicators with dependency resolution
//!
//! Supported families: SMA, EMA, RSI, MACD, Bollinger bands, Fibonacci
//! retracement and period shift. Every output column has exactly one entry per
//! bar; bars with insufficient history carry a null value.

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/mims-rs/mims/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod engine;
mod series;
mod transforms;

pub use engine::IndicatorEngine;
pub use series::CandleSeries;
