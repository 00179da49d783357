//! Store configuration.

use mims_types::BucketWidth;
use serde::{Deserialize, Serialize};

/// Configuration of a [`MemoryStore`](crate::MemoryStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Width of one ingested row.
    ///
    /// A single-row upsert marks `{timestamp, timestamp + base_resolution}`
    /// as available.
    pub base_resolution: BucketWidth,
}

impl StoreConfig {
    /// Creates a configuration with the given base resolution.
    #[must_use]
    pub const fn new(base_resolution: BucketWidth) -> Self {
        Self { base_resolution }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(BucketWidth::FIFTEEN_MINUTES)
    }
}
