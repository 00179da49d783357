//! Lagged close.

/// `closes[i - period]`, `None` for the first `period` bars.
pub(crate) fn period_shift(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    (0..closes.len())
        .map(|i| i.checked_sub(period).map(|lagged| closes[lagged]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift() {
        let out = period_shift(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(out, vec![None, None, Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_shift_beyond_series() {
        assert!(period_shift(&[1.0, 2.0], 3).iter().all(Option::is_none));
    }
}
