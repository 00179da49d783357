//! Indicator specifications and canonical keys.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{IndicatorKey, ValidationError};

/// Indicator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    /// Simple moving average.
    Sma,
    /// Exponential moving average.
    Ema,
    /// Relative strength index.
    Rsi,
    /// Moving average convergence/divergence.
    Macd,
    /// Bollinger bands.
    Bollinger,
    /// Fibonacci retracement.
    Fib,
    /// Lagged close.
    Shift,
}

impl IndicatorKind {
    /// Returns the numeric id reported in registrations.
    #[must_use]
    pub const fn id(&self) -> u32 {
        match self {
            Self::Sma => 1,
            Self::Ema => 2,
            Self::Rsi => 3,
            Self::Macd => 4,
            Self::Shift => 5,
            Self::Fib => 6,
            Self::Bollinger => 7,
        }
    }

    /// Looks up a kind by its registration id.
    #[must_use]
    pub fn from_id(id: u32) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.id() == id)
    }

    /// Returns the kind as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sma => "sma",
            Self::Ema => "ema",
            Self::Rsi => "rsi",
            Self::Macd => "macd",
            Self::Bollinger => "bollinger",
            Self::Fib => "fib",
            Self::Shift => "shift",
        }
    }

    /// Returns the exact parameter names this kind requires.
    #[must_use]
    pub const fn parameter_names(&self) -> &'static [&'static str] {
        match self {
            Self::Sma | Self::Rsi | Self::Fib | Self::Shift => &["period"],
            Self::Ema => &["period", "smoothing"],
            Self::Macd => &["longPeriod", "shortPeriod", "smoothing"],
            Self::Bollinger => &["period", "deviation"],
        }
    }

    /// Returns all indicator kinds.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Sma,
            Self::Ema,
            Self::Rsi,
            Self::Macd,
            Self::Bollinger,
            Self::Fib,
            Self::Shift,
        ]
    }
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IndicatorKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::UnknownIndicator(s.to_string()))
    }
}

/// A named indicator parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name, e.g. `period`.
    pub name: String,
    /// Parameter value.
    pub value: u32,
}

impl Parameter {
    /// Creates a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, value: u32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// An indicator as requested on the wire: a name and loose parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSpec {
    /// Indicator family.
    pub name: IndicatorKind,
    /// Parameters, in any order.
    pub parameters: Vec<Parameter>,
}

impl IndicatorSpec {
    /// Creates a spec.
    #[must_use]
    pub const fn new(name: IndicatorKind, parameters: Vec<Parameter>) -> Self {
        Self { name, parameters }
    }
}

/// A validated indicator with typed parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    /// `sma_{period}`.
    Sma {
        /// Window length.
        period: u32,
    },
    /// `ema_{period}_{smoothing}`.
    Ema {
        /// Window length.
        period: u32,
        /// Smoothing factor numerator.
        smoothing: u32,
    },
    /// `rsi_{period}`.
    Rsi {
        /// Number of one-step differences.
        period: u32,
    },
    /// `macd_{longPeriod}_{shortPeriod}_{smoothing}`.
    Macd {
        /// Slow EMA window.
        long_period: u32,
        /// Fast EMA window.
        short_period: u32,
        /// Smoothing shared by both EMAs.
        smoothing: u32,
    },
    /// `bb_{period}_{deviation}`.
    Bollinger {
        /// Window length.
        period: u32,
        /// Standard deviation multiplier.
        deviation: u32,
    },
    /// `fib_{period}`.
    Fib {
        /// Window length.
        period: u32,
    },
    /// `periodShift_{period}`.
    Shift {
        /// Lag in bars.
        period: u32,
    },
}

impl Indicator {
    /// Returns the indicator family.
    #[must_use]
    pub const fn kind(&self) -> IndicatorKind {
        match self {
            Self::Sma { .. } => IndicatorKind::Sma,
            Self::Ema { .. } => IndicatorKind::Ema,
            Self::Rsi { .. } => IndicatorKind::Rsi,
            Self::Macd { .. } => IndicatorKind::Macd,
            Self::Bollinger { .. } => IndicatorKind::Bollinger,
            Self::Fib { .. } => IndicatorKind::Fib,
            Self::Shift { .. } => IndicatorKind::Shift,
        }
    }

    /// Returns the canonical key identifying this instance.
    #[must_use]
    pub fn key(&self) -> IndicatorKey {
        let key = match *self {
            Self::Sma { period } => format!("sma_{period}"),
            Self::Ema { period, smoothing } => format!("ema_{period}_{smoothing}"),
            Self::Rsi { period } => format!("rsi_{period}"),
            Self::Macd {
                long_period,
                short_period,
                smoothing,
            } => format!("macd_{long_period}_{short_period}_{smoothing}"),
            Self::Bollinger { period, deviation } => format!("bb_{period}_{deviation}"),
            Self::Fib { period } => format!("fib_{period}"),
            Self::Shift { period } => format!("periodShift_{period}"),
        };
        IndicatorKey::from(key)
    }

    /// Returns the parameters in canonical order.
    #[must_use]
    pub fn parameters(&self) -> Vec<Parameter> {
        let values: Vec<u32> = match *self {
            Self::Sma { period }
            | Self::Rsi { period }
            | Self::Fib { period }
            | Self::Shift { period } => vec![period],
            Self::Ema { period, smoothing } => vec![period, smoothing],
            Self::Macd {
                long_period,
                short_period,
                smoothing,
            } => vec![long_period, short_period, smoothing],
            Self::Bollinger { period, deviation } => vec![period, deviation],
        };

        self.kind()
            .parameter_names()
            .iter()
            .zip(values)
            .map(|(name, value)| Parameter::new(*name, value))
            .collect()
    }

    /// Returns the registration recorded when this indicator is computed.
    #[must_use]
    pub fn registration(&self) -> IndicatorRegistration {
        IndicatorRegistration {
            key: self.key(),
            indicator_id: self.kind().id(),
            parameters: self.parameters(),
        }
    }
}

impl TryFrom<&IndicatorSpec> for Indicator {
    type Error = ValidationError;

    fn try_from(spec: &IndicatorSpec) -> Result<Self, Self::Error> {
        let names = spec.name.parameter_names();
        if spec.parameters.len() != names.len() {
            return Err(ValidationError::ParameterSet {
                indicator: spec.name,
                expected: names.join(", "),
            });
        }

        let mut values = Vec::with_capacity(names.len());
        for name in names {
            let mut matching = spec.parameters.iter().filter(|p| p.name == *name);
            let (Some(parameter), None) = (matching.next(), matching.next()) else {
                return Err(ValidationError::ParameterSet {
                    indicator: spec.name,
                    expected: names.join(", "),
                });
            };
            if parameter.value == 0 {
                return Err(ValidationError::NonPositiveParameter {
                    indicator: spec.name,
                    parameter: parameter.name.clone(),
                });
            }
            values.push(parameter.value);
        }

        let indicator = match (spec.name, values.as_slice()) {
            (IndicatorKind::Sma, &[period]) => Self::Sma { period },
            (IndicatorKind::Rsi, &[period]) => Self::Rsi { period },
            (IndicatorKind::Fib, &[period]) => Self::Fib { period },
            (IndicatorKind::Shift, &[period]) => Self::Shift { period },
            (IndicatorKind::Ema, &[period, smoothing]) => Self::Ema { period, smoothing },
            (IndicatorKind::Bollinger, &[period, deviation]) => {
                Self::Bollinger { period, deviation }
            }
            (IndicatorKind::Macd, &[long_period, short_period, smoothing]) => Self::Macd {
                long_period,
                short_period,
                smoothing,
            },
            _ => {
                return Err(ValidationError::ParameterSet {
                    indicator: spec.name,
                    expected: names.join(", "),
                });
            }
        };
        Ok(indicator)
    }
}

impl From<Indicator> for IndicatorSpec {
    fn from(indicator: Indicator) -> Self {
        Self::new(indicator.kind(), indicator.parameters())
    }
}

/// Record of one indicator instance present in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorRegistration {
    /// Canonical key.
    pub key: IndicatorKey,
    /// Numeric indicator family id.
    pub indicator_id: u32,
    /// Parameters in canonical order.
    pub parameters: Vec<Parameter>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: IndicatorKind, params: &[(&str, u32)]) -> IndicatorSpec {
        IndicatorSpec::new(
            name,
            params.iter().map(|(n, v)| Parameter::new(*n, *v)).collect(),
        )
    }

    #[test]
    fn test_keys() {
        let macd = Indicator::try_from(&spec(
            IndicatorKind::Macd,
            &[("smoothing", 2), ("shortPeriod", 12), ("longPeriod", 26)],
        ))
        .unwrap();
        assert_eq!(macd.key().as_str(), "macd_26_12_2");

        let bb = Indicator::Bollinger {
            period: 20,
            deviation: 2,
        };
        assert_eq!(bb.key().as_str(), "bb_20_2");
        assert_eq!(Indicator::Shift { period: 3 }.key().as_str(), "periodShift_3");
    }

    #[test]
    fn test_rejects_wrong_parameter_set() {
        assert!(Indicator::try_from(&spec(IndicatorKind::Sma, &[])).is_err());
        assert!(Indicator::try_from(&spec(IndicatorKind::Sma, &[("length", 5)])).is_err());
        assert!(
            Indicator::try_from(&spec(IndicatorKind::Ema, &[("period", 5), ("period", 6)]))
                .is_err()
        );
        assert!(matches!(
            Indicator::try_from(&spec(IndicatorKind::Rsi, &[("period", 0)])),
            Err(ValidationError::NonPositiveParameter { .. })
        ));
    }

    #[test]
    fn test_registration_parameters_canonical_order() {
        let reg = Indicator::Macd {
            long_period: 26,
            short_period: 12,
            smoothing: 2,
        }
        .registration();
        assert_eq!(reg.indicator_id, 4);
        let names: Vec<_> = reg.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["longPeriod", "shortPeriod", "smoothing"]);
    }

    #[test]
    fn test_spec_deserialize() {
        let json = r#"{"name":"ema","parameters":[{"name":"period","value":9},{"name":"smoothing","value":2}]}"#;
        let parsed: IndicatorSpec = serde_json::from_str(json).unwrap();
        assert_eq!(
            Indicator::try_from(&parsed).unwrap(),
            Indicator::Ema {
                period: 9,
                smoothing: 2
            }
        );
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("MACD".parse::<IndicatorKind>().unwrap(), IndicatorKind::Macd);
        assert!("vwap".parse::<IndicatorKind>().is_err());
    }

    #[test]
    fn test_ids_round_trip() {
        for kind in IndicatorKind::all() {
            assert_eq!(IndicatorKind::from_id(kind.id()), Some(*kind));
        }
        assert_eq!(IndicatorKind::from_id(0), None);
    }
}
