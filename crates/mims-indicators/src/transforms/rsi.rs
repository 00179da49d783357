//! Relative strength index.

/// RSI over the trailing `period` one-step close differences.
///
/// Gains and losses are averaged over `period` (not over their own counts).
/// A window with no losses reads 100, including a perfectly flat window.
pub(crate) fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 {
        return out;
    }

    for i in period..closes.len() {
        let (gains, losses) = closes[i - period..=i].windows(2).fold(
            (0.0, 0.0),
            |(gains, losses), pair| {
                let diff = pair[1] - pair[0];
                if diff > 0.0 {
                    (gains + diff, losses)
                } else {
                    (gains, losses - diff)
                }
            },
        );

        let avg_gain = gains / period as f64;
        let avg_loss = losses / period as f64;
        out[i] = Some(if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        });
    }
    out
}
