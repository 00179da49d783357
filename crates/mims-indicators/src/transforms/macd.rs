//! Moving average convergence/divergence.

/// Fast EMA minus slow EMA wherever both are defined.
pub(crate) fn macd(short_ema: &[Option<f64>], long_ema: &[Option<f64>]) -> Vec<Option<f64>> {
    short_ema
        .iter()
        .zip(long_ema)
        .map(|(short, long)| Some((*short)? - (*long)?))
        .collect()
}
