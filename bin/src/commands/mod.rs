//! CLI command implementations.

pub(crate) mod brokers;
pub(crate) mod coverage;
pub(crate) mod ingest;
pub(crate) mod pairs;
pub(crate) mod query;
