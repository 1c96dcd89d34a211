//! Periodic broad-market scans.
//!
//! The recurring duty is the 1-day extreme sweep: flag any symbol whose
//! daily RSI crosses a statistical extreme. MFI is computed for the
//! record but the pass decision is RSI-only. A multi-timeframe
//! consensus sweep is available as a one-shot operation.

use std::sync::{Arc, RwLock};

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use tokio::sync::broadcast;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info};

use crate::config::{ConsensusConfig, ScannerConfig};
use crate::error::Result;
use crate::services::consensus::ConsensusAnalyzer;
use crate::services::indicators::{last_value, mfi, rsi};
use crate::services::{ActivityDetector, CooldownMap, Notifier};
use crate::sources::{CandleSource, SymbolUniverse};
use crate::types::{ConsensusResult, ExtremeAlert, Timeframe};

/// Timeframes the consensus sweep analyzes.
const CONSENSUS_TIMEFRAMES: [Timeframe; 4] =
    [Timeframe::M5, Timeframe::H1, Timeframe::H4, Timeframe::D1];

/// Universe-wide scanner for daily RSI extremes.
pub struct MarketScanner {
    source: Arc<dyn CandleSource>,
    universe: Arc<dyn SymbolUniverse>,
    activity: Arc<dyn ActivityDetector>,
    notifier: Arc<dyn Notifier>,
    analyzer: ConsensusAnalyzer,
    config: ScannerConfig,
    cooldowns: CooldownMap,
    shutdown_tx: broadcast::Sender<()>,
    running: RwLock<bool>,
}

impl MarketScanner {
    pub fn new(
        source: Arc<dyn CandleSource>,
        universe: Arc<dyn SymbolUniverse>,
        activity: Arc<dyn ActivityDetector>,
        notifier: Arc<dyn Notifier>,
        config: ScannerConfig,
        consensus: ConsensusConfig,
    ) -> Result<Self> {
        config.validate()?;
        let (shutdown_tx, _) = broadcast::channel(1);
        let cooldown_secs = config.cooldown_secs;

        Ok(Self {
            analyzer: ConsensusAnalyzer::new(source.clone(), consensus),
            source,
            universe,
            activity,
            notifier,
            config,
            cooldowns: CooldownMap::new(cooldown_secs),
            shutdown_tx,
            running: RwLock::new(false),
        })
    }

    /// Run the scan loop until `stop` is called.
    pub async fn start(&self) {
        if *self.running.read().unwrap() {
            return;
        }
        *self.running.write().unwrap() = true;
        info!(
            "market scanner started ({}s interval)",
            self.config.interval_secs
        );

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut ticker = interval(Duration::from_secs(self.config.interval_secs));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !*self.running.read().unwrap() {
                        break;
                    }
                    match self.scan_once(Utc::now().timestamp()).await {
                        Ok(batch) => debug!("extreme scan complete: {} alerts", batch.len()),
                        Err(e) => error!("extreme scan failed: {e}"),
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("market scanner received shutdown signal");
                    break;
                }
            }
        }
    }

    /// Signal the scan loop to exit.
    pub fn stop(&self) {
        if !*self.running.read().unwrap() {
            return;
        }
        *self.running.write().unwrap() = false;
        let _ = self.shutdown_tx.send(());
        info!("market scanner stopped");
    }

    /// One full-universe extreme sweep. Flagged symbols are deduped
    /// against the per-symbol cooldown, sorted by extremity and emitted
    /// to the notifier as a single batch.
    pub async fn scan_once(&self, now: i64) -> Result<Vec<ExtremeAlert>> {
        let symbols = self.universe.symbols().await?;
        let scanned = symbols.len();

        let candidates: Vec<ExtremeAlert> = stream::iter(symbols)
            .map(|symbol| async move { self.analyze_symbol(symbol, now).await })
            .buffer_unordered(self.config.max_concurrency)
            .collect::<Vec<Option<ExtremeAlert>>>()
            .await
            .into_iter()
            .flatten()
            .collect();

        // Cooldowns are stamped here, on the scheduling side, after the
        // workers have finished.
        let mut batch: Vec<ExtremeAlert> = Vec::with_capacity(candidates.len());
        for alert in candidates {
            if !self.cooldowns.ready(&alert.symbol, now) {
                continue;
            }
            self.cooldowns.stamp(&alert.symbol, now);
            batch.push(alert);
        }

        batch.sort_by(|a, b| {
            let ea = (a.rsi - 50.0).abs();
            let eb = (b.rsi - 50.0).abs();
            eb.partial_cmp(&ea).unwrap_or(std::cmp::Ordering::Equal)
        });

        self.cooldowns.purge(now);
        debug!("scanned {scanned} symbols, {} extremes", batch.len());

        if !batch.is_empty() {
            self.notifier.extreme_alerts(&batch).await;
        }
        Ok(batch)
    }

    /// One-shot multi-timeframe consensus sweep across the universe.
    /// Returns qualifying results sorted by strength descending.
    pub async fn consensus_scan(&self) -> Result<Vec<ConsensusResult>> {
        let symbols = self.universe.symbols().await?;

        let mut results: Vec<ConsensusResult> = stream::iter(symbols)
            .map(|symbol| async move {
                self.analyzer.analyze(&symbol, &CONSENSUS_TIMEFRAMES).await
            })
            .buffer_unordered(self.config.max_concurrency)
            .collect::<Vec<Option<ConsensusResult>>>()
            .await
            .into_iter()
            .flatten()
            .filter(|result| self.analyzer.qualifies(result))
            .collect();

        results.sort_by(|a, b| b.strength.cmp(&a.strength));
        Ok(results)
    }

    /// Per-symbol daily analysis. Any failure is downgraded to "no
    /// signal" so one symbol can never abort the batch.
    async fn analyze_symbol(&self, symbol: String, now: i64) -> Option<ExtremeAlert> {
        let candles = match self
            .source
            .candles(&symbol, Timeframe::D1, self.config.candle_limit)
            .await
        {
            Ok(candles) => candles,
            Err(e) => {
                debug!("daily fetch failed for {symbol}: {e}");
                return None;
            }
        };
        if candles.len() < self.config.period + 1 {
            return None;
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let rsi_now = last_value(&rsi(&closes, self.config.period))?;

        let mut conditions = Vec::new();
        if rsi_now >= self.config.rsi_upper {
            conditions.push("overbought".to_string());
        } else if rsi_now <= self.config.rsi_lower {
            conditions.push("oversold".to_string());
        }
        if conditions.is_empty() {
            return None;
        }

        // Display-only enrichment; none of it gates the alert.
        let mfi_now = last_value(&mfi(&candles, self.config.period));
        let bot_score = self.activity.bot_score(&symbol).await;
        let pump_score = self.activity.pump_score(&symbol).await;

        Some(ExtremeAlert {
            symbol,
            rsi: rsi_now,
            mfi: mfi_now,
            conditions,
            bot_score,
            pump_score,
            timestamp: now,
        })
    }
}
