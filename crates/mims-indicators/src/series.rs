//! Per-query candle buffer.

use chrono::{DateTime, Utc};
use mims_types::{Annotation, Candle, IndicatorKey, IndicatorRegistration, Ohlcv};

/// The ascending candle sequence of one query, plus the registrations of
/// every indicator computed over it.
///
/// Owned by a single query invocation and discarded afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    candles: Vec<Candle>,
    registrations: Vec<IndicatorRegistration>,
}

impl CandleSeries {
    /// Wraps bars fetched from a candle source.
    #[must_use]
    pub fn from_bars(bars: Vec<Ohlcv>) -> Self {
        Self {
            candles: bars.into_iter().map(Candle::from).collect(),
            registrations: Vec::new(),
        }
    }

    /// Returns the number of bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Returns true if the series has no bars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Returns the bars.
    #[must_use]
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Returns the registrations in the order they were recorded.
    #[must_use]
    pub fn registrations(&self) -> &[IndicatorRegistration] {
        &self.registrations
    }

    /// Returns true if an indicator with `key` has already been computed.
    #[must_use]
    pub fn is_registered(&self, key: &IndicatorKey) -> bool {
        self.registrations.iter().any(|r| &r.key == key)
    }

    /// Returns every close price.
    #[must_use]
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Returns every high price.
    #[must_use]
    pub fn highs(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.high).collect()
    }

    /// Returns every low price.
    #[must_use]
    pub fn lows(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.low).collect()
    }

    /// Returns the scalar column stored under `key`, `None` where absent or null.
    #[must_use]
    pub fn values(&self, key: &IndicatorKey) -> Vec<Option<f64>> {
        self.candles
            .iter()
            .map(|c| c.annotations.get(key).and_then(Annotation::as_value))
            .collect()
    }

    /// Records a registration and writes one annotation per bar.
    ///
    /// `column` must have exactly one entry per bar.
    pub(crate) fn insert_column(
        &mut self,
        registration: IndicatorRegistration,
        column: Vec<Annotation>,
    ) {
        debug_assert_eq!(column.len(), self.candles.len());
        for (candle, annotation) in self.candles.iter_mut().zip(column) {
            candle
                .annotations
                .insert(registration.key.clone(), annotation);
        }
        self.registrations.push(registration);
    }

    /// Drops every annotation and registration whose key is not in `keys`.
    pub fn retain_keys(&mut self, keys: &[IndicatorKey]) {
        for candle in &mut self.candles {
            candle.annotations.retain(|key, _| keys.contains(key));
        }
        self.registrations.retain(|r| keys.contains(&r.key));
    }

    /// Drops leading bars stamped at or before `start`.
    ///
    /// Returns the number of bars removed.
    pub fn trim_through(&mut self, start: DateTime<Utc>) -> usize {
        let warm_up = self
            .candles
            .iter()
            .take_while(|c| c.timestamp <= start)
            .count();
        self.candles.drain(..warm_up);
        warm_up
    }

    /// Consumes the series, returning bars and registrations.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Candle>, Vec<IndicatorRegistration>) {
        (self.candles, self.registrations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use mims_types::Indicator;

    fn series(n: usize) -> CandleSeries {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        CandleSeries::from_bars(
            (0..n)
                .map(|i| Ohlcv::flat(t0 + TimeDelta::minutes(15 * i as i64), i as f64, 1.0))
                .collect(),
        )
    }

    #[test]
    fn test_trim_through_drops_inclusive_prefix() {
        let mut s = series(5);
        let cut = s.candles()[1].timestamp;
        assert_eq!(s.trim_through(cut), 2);
        assert_eq!(s.len(), 3);
        assert_eq!(s.candles()[0].close, 2.0);
    }

    #[test]
    fn test_retain_keys() {
        let mut s = series(3);
        let keep = Indicator::Sma { period: 1 };
        let drop = Indicator::Shift { period: 1 };
        s.insert_column(keep.registration(), vec![Annotation::value(1.0); 3]);
        s.insert_column(drop.registration(), vec![Annotation::NULL; 3]);

        s.retain_keys(&[keep.key()]);
        assert_eq!(s.registrations().len(), 1);
        assert!(s.candles().iter().all(|c| c.annotations.len() == 1));
        assert!(s.is_registered(&keep.key()));
        assert!(!s.is_registered(&drop.key()));
    }
}
