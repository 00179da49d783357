//! Query results.

use serde::{Deserialize, Serialize};

use crate::{Candle, IndicatorRegistration};

/// The outcome of one market-data query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Bars strictly after the requested start, ascending.
    pub bars: Vec<Candle>,
    /// Registrations of the indicators that survived output filtering.
    pub indicators: Vec<IndicatorRegistration>,
}

impl QueryResponse {
    /// Returns true if the response has no bars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}
