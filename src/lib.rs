//! Specter - multi-timeframe market-signal pipeline with staged pump
//! detection.
//!
//! The crate ingests OHLCV candles for a liquidity-ranked symbol
//! universe, computes RSI/MFI/stochastic oscillators across
//! timeframes, folds them into a directional consensus, and runs two
//! scanning services: a periodic daily-extreme sweep and a three-layer
//! staged pump detector. Rendering and delivery of alerts live behind
//! the `Notifier` seam.

pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

pub use config::Config;
pub use error::{AppError, Result};
pub use services::{MarketScanner, StagedPumpDetector};
pub use types::*;
