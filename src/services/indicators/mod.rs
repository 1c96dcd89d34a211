//! Technical indicator calculations.
//!
//! All functions here are pure: an input series in, an aligned output
//! series out. Output values are `Option<f64>` so the warm-up prefix is
//! `None` rather than a misleading zero, and a series shorter than the
//! minimum history yields an all-`None` result instead of an error.

pub mod mfi;
pub mod price;
pub mod rsi;
pub mod stochastic;

pub use mfi::mfi;
pub use price::{hlc3, hlcc4, ohlc4};
pub use rsi::rsi;
pub use stochastic::{stochastic_d, stochastic_k};

/// Last defined value of an indicator series.
pub fn last_value(series: &[Option<f64>]) -> Option<f64> {
    series.iter().rev().find_map(|v| *v)
}
