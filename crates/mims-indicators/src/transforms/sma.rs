//! Simple moving average.

/// Mean of the trailing `period` closes; `None` for the first `period - 1` bars.
pub(crate) fn sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 {
        return out;
    }

    for (offset, window) in closes.windows(period).enumerate() {
        out[offset + period - 1] = Some(window.iter().sum::<f64>() / period as f64);
    }
    out
}
