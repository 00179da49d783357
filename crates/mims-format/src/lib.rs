//! Output formatters for mims query responses.
//!
//! - [`CsvFormatter`] - CSV with flattened annotation columns
//! - [`JsonFormatter`] - JSON envelope or NDJSON bar tuples

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/mims-rs/mims/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod csv;
mod formatter;
mod json;

pub use crate::csv::CsvFormatter;
pub use formatter::{FormatError, Formatter, OutputFormat};
pub use json::{JsonFormatter, JsonStyle};
