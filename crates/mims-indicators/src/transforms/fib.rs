//! Fibonacci retracement.

use mims_types::FibLevels;

/// Retracement levels between the trailing window's lowest low and highest high.
pub(crate) fn fibonacci(highs: &[f64], lows: &[f64], period: usize) -> Vec<Option<FibLevels>> {
    let mut out = vec![None; highs.len()];
    if period == 0 {
        return out;
    }

    for (offset, (high_window, low_window)) in
        highs.windows(period).zip(lows.windows(period)).enumerate()
    {
        let max = high_window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = low_window.iter().copied().fold(f64::INFINITY, f64::min);
        out[offset + period - 1] = Some(FibLevels::between(min, max));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fib_window_extremes() {
        let out = fibonacci(&[1.0, 5.0, 3.0], &[0.0, 1.0, 1.0], 3);
        assert!(out[0].is_none() && out[1].is_none());

        let levels = out[2].unwrap();
        assert_relative_eq!(levels.level_0, 0.0);
        assert_relative_eq!(levels.level_100, 5.0);
        assert_relative_eq!(levels.level_23_6, 1.18);
        assert_relative_eq!(levels.level_38_2, 1.91);
        assert_relative_eq!(levels.level_50, 2.5);
        assert_relative_eq!(levels.level_61_8, 3.09);
        assert_relative_eq!(levels.level_78_6, 3.93);
    }
}
