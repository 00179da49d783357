//! Bollinger bands.

use mims_types::Band;

/// Bands at `deviation` population standard deviations around `sma`.
pub(crate) fn bollinger(
    closes: &[f64],
    sma: &[Option<f64>],
    period: usize,
    deviation: f64,
) -> Vec<Option<Band>> {
    let mut out = vec![None; closes.len()];
    if period == 0 {
        return out;
    }

    for (offset, window) in closes.windows(period).enumerate() {
        let i = offset + period - 1;
        let Some(mean) = sma[i] else { continue };
        let variance = window.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / period as f64;
        let std = variance.sqrt();
        out[i] = Some(Band {
            upper: mean + deviation * std,
            lower: mean - deviation * std,
        });
    }
    out
}
