//! Exponential moving average.

/// EMA seeded with the SMA of the first full window.
///
/// The weight of each new close is `smoothing / (period + 1)`.
pub(crate) fn ema(closes: &[f64], period: usize, smoothing: f64) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return out;
    }

    let alpha = smoothing / (period as f64 + 1.0);
    let seed = closes[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(seed);

    let mut prev = seed;
    for (i, close) in closes.iter().enumerate().skip(period) {
        prev = prev * (1.0 - alpha) + alpha * close;
        out[i] = Some(prev);
    }
    out
}
