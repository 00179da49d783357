//! Brokers and trading pairs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a broker.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct BrokerId(Uuid);

impl BrokerId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Unique identifier of a trading pair.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct PairId(Uuid);

impl PairId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

/// A venue that quotes pairs (e.g. `COINBASE`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broker {
    /// Broker id.
    pub id: BrokerId,
    /// Broker name, unique.
    pub name: String,
}

impl Broker {
    /// Creates a broker with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BrokerId::new_v4(),
            name: name.into(),
        }
    }
}

/// A base/quote pair quoted by one broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    /// Pair id.
    pub id: PairId,
    /// Base asset (e.g. `BTC`).
    pub base: String,
    /// Quote asset (e.g. `USD`).
    pub quote: String,
    /// Owning broker.
    pub broker_id: BrokerId,
}

impl Pair {
    /// Creates a pair with a fresh id.
    #[must_use]
    pub fn new(base: impl Into<String>, quote: impl Into<String>, broker_id: BrokerId) -> Self {
        Self {
            id: PairId::new_v4(),
            base: base.into(),
            quote: quote.into(),
            broker_id,
        }
    }

    /// Returns the `BASE/QUOTE` symbol.
    #[must_use]
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }

    /// Splits a `BASE/QUOTE` symbol.
    #[must_use]
    pub fn split_symbol(symbol: &str) -> Option<(&str, &str)> {
        let (base, quote) = symbol.split_once('/')?;
        if base.is_empty() || quote.is_empty() || quote.contains('/') {
            return None;
        }
        Some((base, quote))
    }
}
