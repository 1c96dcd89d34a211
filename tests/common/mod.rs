//! Shared test fixtures: synthetic candle builders and mock
//! collaborators for the scanner/detector integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use specter::error::Result;
use specter::services::{ActivityDetector, Notifier, Watchlist};
use specter::sources::{CandleSource, SymbolUniverse};
use specter::types::{Candle, ExtremeAlert, PumpAlert, Timeframe};

pub fn candle(open_time: i64, open: f64, close: f64, volume: f64) -> Candle {
    Candle {
        open_time,
        open,
        high: open.max(close) + 0.1,
        low: open.min(close) - 0.1,
        close,
        volume,
    }
}

/// Flat market: every bar closes where it opened.
pub fn flat_series(count: usize, price: f64, volume: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| candle(i as i64 * 60_000, price, price, volume))
        .collect()
}

/// Steady climb of `step` per bar.
pub fn uptrend(count: usize, start: f64, step: f64, volume: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let open = start + i as f64 * step;
            candle(i as i64 * 60_000, open, open + step, volume)
        })
        .collect()
}

/// Steady decline of `step` per bar.
pub fn downtrend(count: usize, start: f64, step: f64, volume: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let open = start - i as f64 * step;
            candle(i as i64 * 60_000, open, open - step, volume)
        })
        .collect()
}

/// 25 quiet 5m bars then a 5-bar pump: +3% total, all green, volume
/// climbing to 4x baseline. Scores well above the Layer 1 threshold.
pub fn pump_m5_series() -> Vec<Candle> {
    let mut candles: Vec<Candle> = (0..25)
        .map(|i| candle(i as i64 * 300_000, 100.0, 100.0, 1000.0))
        .collect();
    let closes = [100.6, 101.2, 101.8, 102.4, 103.0];
    let volumes = [1500.0, 2000.0, 2500.0, 3000.0, 4000.0];
    let mut prev_close = 100.0;
    for (i, (close, volume)) in closes.iter().zip(volumes.iter()).enumerate() {
        candles.push(candle((25 + i) as i64 * 300_000, prev_close, *close, *volume));
        prev_close = *close;
    }
    candles
}

/// Candle source backed by a fixed (symbol, timeframe) map. Unknown
/// keys return an empty series, like the real provider contract.
pub struct MockCandleSource {
    data: HashMap<(String, Timeframe), Vec<Candle>>,
}

impl MockCandleSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn insert(&mut self, symbol: &str, timeframe: Timeframe, candles: Vec<Candle>) {
        self.data.insert((symbol.to_string(), timeframe), candles);
    }
}

#[async_trait]
impl CandleSource for MockCandleSource {
    async fn candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let candles = self
            .data
            .get(&(symbol.to_string(), timeframe))
            .cloned()
            .unwrap_or_default();
        let start = candles.len().saturating_sub(limit);
        Ok(candles[start..].to_vec())
    }
}

/// Fixed symbol universe.
pub struct StaticUniverse(pub Vec<String>);

#[async_trait]
impl SymbolUniverse for StaticUniverse {
    async fn symbols(&self) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Records every delivered alert for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    pumps: Mutex<Vec<PumpAlert>>,
    extreme_batches: Mutex<Vec<Vec<ExtremeAlert>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pump_alerts(&self) -> Vec<PumpAlert> {
        self.pumps.lock().unwrap().clone()
    }

    pub fn extreme_batches(&self) -> Vec<Vec<ExtremeAlert>> {
        self.extreme_batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn pump_alert(&self, alert: &PumpAlert) {
        self.pumps.lock().unwrap().push(alert.clone());
    }

    async fn extreme_alerts(&self, alerts: &[ExtremeAlert]) {
        self.extreme_batches.lock().unwrap().push(alerts.to_vec());
    }
}

/// Activity detector with fixed scores.
pub struct StaticActivity {
    pub bot: Option<f64>,
    pub pump: Option<f64>,
}

#[async_trait]
impl ActivityDetector for StaticActivity {
    async fn bot_score(&self, _symbol: &str) -> Option<f64> {
        self.bot
    }

    async fn pump_score(&self, _symbol: &str) -> Option<f64> {
        self.pump
    }
}

/// Watchlist that counts additions without bounds of its own.
#[derive(Default)]
pub struct RecordingWatchlist {
    symbols: Mutex<Vec<String>>,
}

impl RecordingWatchlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbols(&self) -> Vec<String> {
        self.symbols.lock().unwrap().clone()
    }
}

#[async_trait]
impl Watchlist for RecordingWatchlist {
    async fn add(&self, symbol: &str) -> bool {
        let mut symbols = self.symbols.lock().unwrap();
        if symbols.iter().any(|s| s == symbol) {
            return false;
        }
        symbols.push(symbol.to_string());
        true
    }

    async fn count(&self) -> usize {
        self.symbols.lock().unwrap().len()
    }
}
