//! Core types for the mims market-data service.
//!
//! This crate provides the fundamental data structures used throughout mims:
//!
//! - [`Interval`] / [`IntervalSet`] - Closed time ranges and coverage algebra
//! - [`Ohlcv`] - A plain candlestick row
//! - [`Candle`] / [`Annotation`] - Candles annotated with indicator outputs
//! - [`IndicatorSpec`] / [`Indicator`] - Requested and validated indicators
//! - [`BucketWidth`] - Rollup bucket width
//! - [`Broker`] / [`Pair`] - Registry rows
//! - [`QueryResponse`] - Annotated bars plus retained registrations
//! - [`MimsError`] - The error taxonomy shared by every crate

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/mims-rs/mims/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bucket;
mod candle;
mod error;
mod indicator;
mod interval;
mod ohlcv;
mod pair;
mod response;

pub use bucket::{BucketWidth, BucketWidthParseError, MINUTES_PER_MONTH, MINUTES_PER_YEAR};
pub use candle::{Annotation, Band, Candle, FibLevels, IndicatorKey};
pub use error::{ErrorKind, IntervalError, MimsError, Result, ValidationError};
pub use indicator::{Indicator, IndicatorKind, IndicatorRegistration, IndicatorSpec, Parameter};
pub use interval::{Interval, IntervalSet};
pub use ohlcv::Ohlcv;
pub use pair::{Broker, BrokerId, Pair, PairId};
pub use response::QueryResponse;
