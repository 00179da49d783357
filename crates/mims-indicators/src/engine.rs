//! Indicator evaluation with dependency resolution and memoization.

use mims_types::{Annotation, Indicator, IndicatorKey};

use crate::series::CandleSeries;
use crate::transforms;

/// Computes indicator columns onto a [`CandleSeries`].
///
/// Each distinct indicator is evaluated at most once per series; derived
/// indicators compute their dependencies first and read them back from the
/// series. Dependencies stay registered until the caller strips them with
/// [`CandleSeries::retain_keys`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorEngine;

impl IndicatorEngine {
    /// Creates an engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the indicators `indicator` reads from the series.
    #[must_use]
    pub fn dependencies(indicator: &Indicator) -> Vec<Indicator> {
        match *indicator {
            Indicator::Macd {
                long_period,
                short_period,
                smoothing,
            } => vec![
                Indicator::Ema {
                    period: long_period,
                    smoothing,
                },
                Indicator::Ema {
                    period: short_period,
                    smoothing,
                },
            ],
            Indicator::Bollinger { period, .. } => vec![Indicator::Sma { period }],
            _ => Vec::new(),
        }
    }

    /// Computes `indicator` (and its dependencies) unless already present.
    ///
    /// Returns the indicator's key.
    pub fn compute(&self, series: &mut CandleSeries, indicator: &Indicator) -> IndicatorKey {
        let key = indicator.key();
        if series.is_registered(&key) {
            tracing::trace!(key = %key, "indicator already computed");
            return key;
        }

        for dependency in Self::dependencies(indicator) {
            self.compute(series, &dependency);
        }

        let column = Self::evaluate(series, indicator);
        tracing::debug!(key = %key, bars = series.len(), "computed indicator");
        series.insert_column(indicator.registration(), column);
        key
    }

    /// Computes every indicator in order, returning the deduplicated keys
    /// that were requested.
    pub fn compute_all(&self, series: &mut CandleSeries, indicators: &[Indicator]) -> Vec<IndicatorKey> {
        let mut keys: Vec<IndicatorKey> = Vec::with_capacity(indicators.len());
        for indicator in indicators {
            let key = self.compute(series, indicator);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    fn evaluate(series: &CandleSeries, indicator: &Indicator) -> Vec<Annotation> {
        match *indicator {
            Indicator::Sma { period } => scalars(transforms::sma(&series.closes(), period as usize)),
            Indicator::Ema { period, smoothing } => scalars(transforms::ema(
                &series.closes(),
                period as usize,
                f64::from(smoothing),
            )),
            Indicator::Rsi { period } => scalars(transforms::rsi(&series.closes(), period as usize)),
            Indicator::Macd {
                long_period,
                short_period,
                smoothing,
            } => {
                let long = series.values(
                    &Indicator::Ema {
                        period: long_period,
                        smoothing,
                    }
                    .key(),
                );
                let short = series.values(
                    &Indicator::Ema {
                        period: short_period,
                        smoothing,
                    }
                    .key(),
                );
                scalars(transforms::macd(&short, &long))
            }
            Indicator::Bollinger { period, deviation } => {
                let sma = series.values(&Indicator::Sma { period }.key());
                transforms::bollinger(
                    &series.closes(),
                    &sma,
                    period as usize,
                    f64::from(deviation),
                )
                .into_iter()
                .map(|band| band.map_or(Annotation::NULL, Annotation::Band))
                .collect()
            }
            Indicator::Fib { period } => {
                transforms::fibonacci(&series.highs(), &series.lows(), period as usize)
                    .into_iter()
                    .map(|levels| levels.map_or(Annotation::NULL, Annotation::Levels))
                    .collect()
            }
            Indicator::Shift { period } => {
                scalars(transforms::period_shift(&series.closes(), period as usize))
            }
        }
    }
}

fn scalars(column: Vec<Option<f64>>) -> Vec<Annotation> {
    column
        .into_iter()
        .map(|value| Annotation::Scalar { value })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependencies() {
        let macd = Indicator::Macd {
            long_period: 26,
            short_period: 12,
            smoothing: 2,
        };
        let deps: Vec<String> = IndicatorEngine::dependencies(&macd)
            .iter()
            .map(|d| d.key().to_string())
            .collect();
        assert_eq!(deps, ["ema_26_2", "ema_12_2"]);

        let bb = Indicator::Bollinger {
            period: 20,
            deviation: 2,
        };
        assert_eq!(
            IndicatorEngine::dependencies(&bb),
            vec![Indicator::Sma { period: 20 }]
        );
        assert!(IndicatorEngine::dependencies(&Indicator::Rsi { period: 14 }).is_empty());
    }
}
