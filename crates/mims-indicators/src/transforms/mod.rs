//! Per-indicator column transforms.
//!
//! Each function takes the price columns it needs and returns exactly one
//! entry per bar, `None` where history is insufficient.

mod bollinger;
mod ema;
mod fib;
mod macd;
mod rsi;
mod shift;
mod sma;

pub(crate) use bollinger::bollinger;
pub(crate) use ema::ema;
pub(crate) use fib::fibonacci;
pub(crate) use macd::macd;
pub(crate) use rsi::rsi;
pub(crate) use shift::period_shift;
pub(crate) use sma::sma;
