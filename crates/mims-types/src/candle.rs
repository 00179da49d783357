//! Annotated candles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Ohlcv;

/// Canonical string naming one indicator instance, e.g. `sma_20` or
/// `macd_26_12_2`.
#[derive(
    Debug,
    Clone,
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
pub struct IndicatorKey(String);

impl IndicatorKey {
    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IndicatorKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl std::borrow::Borrow<str> for IndicatorKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Upper and lower envelope around a moving average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Upper band.
    pub upper: f64,
    /// Lower band.
    pub lower: f64,
}

/// Fibonacci retracement levels between a window's low and high.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibLevels {
    /// 0% level (window low).
    #[serde(rename = "0")]
    pub level_0: f64,
    /// 23.6% level.
    #[serde(rename = "23.6")]
    pub level_23_6: f64,
    /// 38.2% level.
    #[serde(rename = "38.2")]
    pub level_38_2: f64,
    /// 50% level.
    #[serde(rename = "50")]
    pub level_50: f64,
    /// 61.8% level.
    #[serde(rename = "61.8")]
    pub level_61_8: f64,
    /// 78.6% level.
    #[serde(rename = "78.6")]
    pub level_78_6: f64,
    /// 100% level (window high).
    #[serde(rename = "100")]
    pub level_100: f64,
}

impl FibLevels {
    /// Level labels in ascending ratio order, as used for serialized keys.
    pub const LABELS: [&'static str; 7] = ["0", "23.6", "38.2", "50", "61.8", "78.6", "100"];

    /// Interpolates every level between `min` and `max`.
    #[must_use]
    pub fn between(min: f64, max: f64) -> Self {
        let level = |ratio: f64| min + (max - min) * ratio;
        Self {
            level_0: min,
            level_23_6: level(0.236),
            level_38_2: level(0.382),
            level_50: level(0.5),
            level_61_8: level(0.618),
            level_78_6: level(0.786),
            level_100: max,
        }
    }

    /// Returns the levels in ascending ratio order, labelled.
    #[must_use]
    pub const fn labelled(&self) -> [(&'static str, f64); 7] {
        [
            (Self::LABELS[0], self.level_0),
            (Self::LABELS[1], self.level_23_6),
            (Self::LABELS[2], self.level_38_2),
            (Self::LABELS[3], self.level_50),
            (Self::LABELS[4], self.level_61_8),
            (Self::LABELS[5], self.level_78_6),
            (Self::LABELS[6], self.level_100),
        ]
    }
}

/// One indicator output attached to one candle.
///
/// Insufficient history is always represented as `Scalar { value: None }`,
/// whatever the indicator's structured shape, so responses keep a uniform
/// null placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Annotation {
    /// Bollinger-style envelope.
    Band(Band),
    /// Fibonacci retracement levels.
    Levels(FibLevels),
    /// A single value, or `None` when history is insufficient.
    Scalar {
        /// The value.
        value: Option<f64>,
    },
}

impl Annotation {
    /// The placeholder for bars without enough history.
    pub const NULL: Self = Self::Scalar { value: None };

    /// Creates a scalar annotation.
    #[must_use]
    pub const fn value(value: f64) -> Self {
        Self::Scalar { value: Some(value) }
    }

    /// Returns the scalar value, if this is a non-null scalar.
    #[must_use]
    pub const fn as_value(&self) -> Option<f64> {
        match self {
            Self::Scalar { value } => *value,
            _ => None,
        }
    }

    /// Returns true for the null placeholder.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Scalar { value: None })
    }
}

/// A bar plus the indicator outputs computed for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket start.
    pub timestamp: DateTime<Utc>,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume.
    pub volume: f64,
    /// Indicator outputs keyed by canonical indicator key.
    pub annotations: BTreeMap<IndicatorKey, Annotation>,
}

impl Candle {
    /// Returns the annotation stored under `key`.
    #[must_use]
    pub fn annotation(&self, key: &str) -> Option<&Annotation> {
        self.annotations.get(key)
    }

    /// Returns the bare OHLCV values.
    #[must_use]
    pub const fn ohlcv(&self) -> Ohlcv {
        Ohlcv::new(
            self.timestamp,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
        )
    }
}

impl From<Ohlcv> for Candle {
    fn from(bar: Ohlcv) -> Self {
        Self {
            timestamp: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            annotations: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_json_shapes() {
        let scalar = serde_json::to_string(&Annotation::value(1.5)).unwrap();
        assert_eq!(scalar, r#"{"value":1.5}"#);

        let null = serde_json::to_string(&Annotation::NULL).unwrap();
        assert_eq!(null, r#"{"value":null}"#);

        let band = serde_json::to_string(&Annotation::Band(Band {
            upper: 2.0,
            lower: 1.0,
        }))
        .unwrap();
        assert_eq!(band, r#"{"upper":2.0,"lower":1.0}"#);
    }

    #[test]
    fn test_annotation_deserializes_each_shape() {
        let band: Annotation = serde_json::from_str(r#"{"upper":2.0,"lower":1.0}"#).unwrap();
        assert!(matches!(band, Annotation::Band(_)));

        let null: Annotation = serde_json::from_str(r#"{"value":null}"#).unwrap();
        assert!(null.is_null());

        let levels = FibLevels::between(0.0, 10.0);
        let json = serde_json::to_string(&Annotation::Levels(levels)).unwrap();
        assert!(json.contains(r#""61.8":"#));
        let back: Annotation = serde_json::from_str(&json).unwrap();
        match back {
            Annotation::Levels(parsed) => {
                assert!((parsed.level_61_8 - levels.level_61_8).abs() < 1e-9);
            }
            other => panic!("expected levels, got {other:?}"),
        }
    }

    #[test]
    fn test_fib_levels_between() {
        let levels = FibLevels::between(0.0, 5.0);
        assert_eq!(levels.level_0, 0.0);
        assert_eq!(levels.level_100, 5.0);
        assert!((levels.level_50 - 2.5).abs() < 1e-12);
        assert!((levels.level_23_6 - 1.18).abs() < 1e-12);
    }
}
