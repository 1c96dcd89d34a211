//! Core services: indicator math, consensus, scanning and staged
//! pump detection, plus the collaborator contracts they depend on.

pub mod consensus;
pub mod cooldown;
pub mod detector;
pub mod indicators;
pub mod scanner;

pub use consensus::ConsensusAnalyzer;
pub use cooldown::CooldownMap;
pub use detector::StagedPumpDetector;
pub use scanner::MarketScanner;

use async_trait::async_trait;
use dashmap::DashSet;
use tracing::info;

use crate::types::{ExtremeAlert, PumpAlert};

/// External bot/institutional-activity detector. Scores are opaque
/// 0-100 inputs; how they are computed is the collaborator's business.
#[async_trait]
pub trait ActivityDetector: Send + Sync {
    async fn bot_score(&self, symbol: &str) -> Option<f64>;
    async fn pump_score(&self, symbol: &str) -> Option<f64>;
}

/// Detector used when no external activity feed is wired in.
pub struct NoActivityDetector;

#[async_trait]
impl ActivityDetector for NoActivityDetector {
    async fn bot_score(&self, _symbol: &str) -> Option<f64> {
        None
    }

    async fn pump_score(&self, _symbol: &str) -> Option<f64> {
        None
    }
}

/// Receives finalized detection records. Rendering, localization and
/// delivery all live behind this seam.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn pump_alert(&self, alert: &PumpAlert);
    async fn extreme_alerts(&self, alerts: &[ExtremeAlert]);
}

/// Default notifier: emits each record as a structured log line.
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn pump_alert(&self, alert: &PumpAlert) {
        match serde_json::to_string(alert) {
            Ok(json) => info!(target: "specter::alerts", "pump alert: {json}"),
            Err(e) => info!(target: "specter::alerts", "pump alert for {} (serialize failed: {e})", alert.symbol),
        }
    }

    async fn extreme_alerts(&self, alerts: &[ExtremeAlert]) {
        for alert in alerts {
            match serde_json::to_string(alert) {
                Ok(json) => info!(target: "specter::alerts", "extreme: {json}"),
                Err(e) => info!(target: "specter::alerts", "extreme for {} (serialize failed: {e})", alert.symbol),
            }
        }
    }
}

/// Watch collection the detector auto-registers high-confidence
/// symbols into.
#[async_trait]
pub trait Watchlist: Send + Sync {
    /// Add a symbol. Returns false when full or already present.
    async fn add(&self, symbol: &str) -> bool;
    async fn count(&self) -> usize;
}

/// Bounded in-memory watchlist.
pub struct MemoryWatchlist {
    capacity: usize,
    symbols: DashSet<String>,
}

impl MemoryWatchlist {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            symbols: DashSet::new(),
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }
}

#[async_trait]
impl Watchlist for MemoryWatchlist {
    async fn add(&self, symbol: &str) -> bool {
        if self.symbols.len() >= self.capacity || self.symbols.contains(symbol) {
            return false;
        }
        self.symbols.insert(symbol.to_string())
    }

    async fn count(&self) -> usize {
        self.symbols.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_watchlist_respects_capacity() {
        let list = MemoryWatchlist::new(2);
        assert!(list.add("AUSDT").await);
        assert!(list.add("BUSDT").await);
        assert!(!list.add("CUSDT").await);
        assert_eq!(list.count().await, 2);
    }

    #[tokio::test]
    async fn test_memory_watchlist_rejects_duplicates() {
        let list = MemoryWatchlist::new(10);
        assert!(list.add("AUSDT").await);
        assert!(!list.add("AUSDT").await);
        assert_eq!(list.count().await, 1);
    }

    #[tokio::test]
    async fn test_no_activity_detector_returns_none() {
        let detector = NoActivityDetector;
        assert_eq!(detector.bot_score("AUSDT").await, None);
        assert_eq!(detector.pump_score("AUSDT").await, None);
    }
}
