//! Staged pump detection.
//!
//! Three independently scheduled layers analyze the same symbol
//! universe at different cadences and accumulate evidence in a shared
//! per-symbol state map:
//!
//! - Layer 1 (180s): fast volume/momentum screen on 5m candles.
//! - Layer 2 (600s): 1h/4h confirmation of flagged symbols, with a
//!   timeout that evicts stale flags.
//! - Layer 3 (900s): daily trend-safety evaluation, then a weighted
//!   final score, cooldown-gated alerting and optional watchlist
//!   auto-registration.
//!
//! Workers only read candles and return pure results; the state map
//! and cooldowns are mutated on the scheduling task after fan-in, so a
//! symbol's promotion can never race its own eviction.

pub mod layer1;
pub mod layer2;
pub mod layer3;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use tokio::sync::{broadcast, Mutex};
use tokio::time::{interval, Duration};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::DetectorConfig;
use crate::error::Result;
use crate::services::{ActivityDetector, CooldownMap, Notifier, Watchlist};
use crate::sources::{CandleSource, SymbolUniverse};
use crate::types::{
    Candle, DetectionState, Layer1Result, Layer2Result, Layer3Result, PumpAlert, Timeframe,
};

/// State owned by the scheduling task. Everything behind one lock so a
/// layer's evict-snapshot-apply sequence is atomic per scan.
struct SchedulerState {
    states: HashMap<String, DetectionState>,
    last_layer1: i64,
    last_layer2: i64,
    last_layer3: i64,
}

/// Three-layer, time-staggered pump detector.
pub struct StagedPumpDetector {
    source: Arc<dyn CandleSource>,
    universe: Arc<dyn SymbolUniverse>,
    activity: Arc<dyn ActivityDetector>,
    notifier: Arc<dyn Notifier>,
    watchlist: Arc<dyn Watchlist>,
    config: DetectorConfig,
    scheduler: Mutex<SchedulerState>,
    cooldowns: CooldownMap,
    shutdown_tx: broadcast::Sender<()>,
    running: RwLock<bool>,
}

impl StagedPumpDetector {
    pub fn new(
        source: Arc<dyn CandleSource>,
        universe: Arc<dyn SymbolUniverse>,
        activity: Arc<dyn ActivityDetector>,
        notifier: Arc<dyn Notifier>,
        watchlist: Arc<dyn Watchlist>,
        config: DetectorConfig,
    ) -> Result<Self> {
        config.validate()?;
        let (shutdown_tx, _) = broadcast::channel(1);
        let alert_cooldown = config.alert_cooldown_secs;

        Ok(Self {
            source,
            universe,
            activity,
            notifier,
            watchlist,
            config,
            scheduler: Mutex::new(SchedulerState {
                states: HashMap::new(),
                last_layer1: 0,
                last_layer2: 0,
                last_layer3: 0,
            }),
            cooldowns: CooldownMap::new(alert_cooldown),
            shutdown_tx,
            running: RwLock::new(false),
        })
    }

    /// Run the scheduling loop until `stop` is called. The loop wakes
    /// every `tick_secs` and triggers whichever layers are due.
    pub async fn start(&self) {
        if *self.running.read().unwrap() {
            return;
        }
        *self.running.write().unwrap() = true;
        info!(
            "staged pump detector started (layers every {}s/{}s/{}s)",
            self.config.layer1_interval_secs,
            self.config.layer2_interval_secs,
            self.config.layer3_interval_secs
        );

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut ticker = interval(Duration::from_secs(self.config.tick_secs));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !*self.running.read().unwrap() {
                        break;
                    }
                    self.tick(Utc::now().timestamp()).await;
                }
                _ = shutdown_rx.recv() => {
                    info!("staged pump detector received shutdown signal");
                    break;
                }
            }
        }
    }

    /// Signal the scheduling loop to exit. No new work is scheduled
    /// after this; in-flight workers finish naturally.
    pub fn stop(&self) {
        if !*self.running.read().unwrap() {
            return;
        }
        *self.running.write().unwrap() = false;
        let _ = self.shutdown_tx.send(());
        info!("staged pump detector stopped");
    }

    /// One scheduler wake-up: run whichever layers are due at `now`.
    /// Layer failures are logged and retried at the next due tick.
    pub async fn tick(&self, now: i64) {
        let (layer1_due, layer2_due, layer3_due) = {
            let state = self.scheduler.lock().await;
            (
                now - state.last_layer1 >= self.config.layer1_interval_secs,
                now - state.last_layer2 >= self.config.layer2_interval_secs,
                now - state.last_layer3 >= self.config.layer3_interval_secs,
            )
        };

        if layer1_due {
            if let Err(e) = self.run_layer1_scan(now).await {
                error!("layer 1 scan failed: {e}");
            }
        }
        if layer2_due {
            if let Err(e) = self.run_layer2_scan(now).await {
                error!("layer 2 scan failed: {e}");
            }
        }
        if layer3_due {
            if let Err(e) = self.run_layer3_scan(now).await {
                error!("layer 3 scan failed: {e}");
            }
        }

        self.cooldowns.purge(now);
    }

    /// Layer 1: screen the whole universe on 5m candles and flag new
    /// candidates. Returns how many symbols were flagged.
    pub async fn run_layer1_scan(&self, now: i64) -> Result<usize> {
        {
            let mut state = self.scheduler.lock().await;
            state.last_layer1 = now;
        }

        let symbols = self.universe.symbols().await?;
        let tracked: HashSet<String> = {
            let state = self.scheduler.lock().await;
            state.states.keys().cloned().collect()
        };
        let candidates: Vec<String> = symbols
            .into_iter()
            .filter(|s| !tracked.contains(s))
            .collect();

        let results: Vec<(String, Option<Layer1Result>)> = stream::iter(candidates)
            .map(|symbol| async move {
                let result = self.screen_symbol(&symbol, now).await;
                (symbol, result)
            })
            .buffer_unordered(self.config.max_concurrency)
            .collect()
            .await;

        let mut flagged = 0;
        let mut state = self.scheduler.lock().await;
        for (symbol, result) in results {
            let Some(result) = result else { continue };
            if result.score >= self.config.layer1_threshold && !state.states.contains_key(&symbol)
            {
                info!(
                    "layer 1 flagged {symbol}: score {:.1} (volume x{:.1}, {:+.2}%)",
                    result.score, result.volume_ratio, result.price_change_pct
                );
                state
                    .states
                    .insert(symbol.clone(), DetectionState::new(symbol, result, now));
                flagged += 1;
            }
        }
        Ok(flagged)
    }

    /// Layer 2: evict flags that timed out unconfirmed, then try to
    /// confirm the rest on 1h/4h data. Returns how many confirmed.
    pub async fn run_layer2_scan(&self, now: i64) -> Result<usize> {
        let pending: Vec<(String, Layer1Result)> = {
            let mut state = self.scheduler.lock().await;
            state.last_layer2 = now;

            let timeout = self.config.pending_timeout_secs;
            state.states.retain(|symbol, entry| {
                let expired = entry.is_pending_confirmation() && now - entry.layer1_at > timeout;
                if expired {
                    debug!("layer 1 flag for {symbol} expired unconfirmed");
                }
                !expired
            });

            state
                .states
                .values()
                .filter(|entry| entry.is_pending_confirmation())
                .map(|entry| (entry.symbol.clone(), entry.layer1.clone()))
                .collect()
        };

        let results: Vec<(String, Option<Layer2Result>)> = stream::iter(pending)
            .map(|(symbol, layer1)| async move {
                let result = self.confirm_symbol(&symbol, &layer1, now).await;
                (symbol, result)
            })
            .buffer_unordered(self.config.max_concurrency)
            .collect()
            .await;

        let mut confirmed = 0;
        let mut state = self.scheduler.lock().await;
        for (symbol, result) in results {
            let Some(result) = result else { continue };
            if result.score < self.config.layer2_threshold {
                debug!(
                    "{symbol} confirmation score {:.1} below threshold, flag kept",
                    result.score
                );
                continue;
            }
            if let Some(entry) = state.states.get_mut(&symbol) {
                if entry.is_pending_confirmation() {
                    info!("layer 2 confirmed {symbol}: score {:.1}", result.score);
                    entry.layer2 = Some(result);
                    entry.layer2_at = Some(now);
                    confirmed += 1;
                }
            }
        }
        Ok(confirmed)
    }

    /// Layer 3: evaluate confirmed symbols on daily data, fuse the
    /// final score and alert through the cooldown gate. Evaluated
    /// symbols are retired whether or not they alert.
    pub async fn run_layer3_scan(&self, now: i64) -> Result<Vec<PumpAlert>> {
        let awaiting: Vec<String> = {
            let mut state = self.scheduler.lock().await;
            state.last_layer3 = now;
            state
                .states
                .values()
                .filter(|entry| entry.is_awaiting_trend())
                .map(|entry| entry.symbol.clone())
                .collect()
        };

        let results: Vec<(String, Option<Layer3Result>)> = stream::iter(awaiting)
            .map(|symbol| async move {
                let result = self.evaluate_symbol(&symbol, now).await;
                (symbol, result)
            })
            .buffer_unordered(self.config.max_concurrency)
            .collect()
            .await;

        let mut alerts = Vec::new();
        let mut watch_candidates = Vec::new();
        {
            let mut state = self.scheduler.lock().await;
            for (symbol, result) in results {
                // No daily data this tick: stay confirmed, retry next scan.
                let Some(result) = result else { continue };
                let Some(entry) = state.states.remove(&symbol) else {
                    continue;
                };
                let Some(layer2) = entry.layer2.clone() else {
                    continue;
                };

                let combined =
                    self.combined_score(entry.layer1.score, layer2.score, result.score);
                if combined < self.config.final_threshold {
                    debug!("{symbol} combined score {combined:.1} below threshold, retired");
                    continue;
                }
                if !self.cooldowns.ready(&symbol, now) {
                    debug!("{symbol} within alert cooldown, suppressed");
                    continue;
                }

                self.cooldowns.stamp(&symbol, now);
                if combined >= self.config.auto_watch_threshold {
                    watch_candidates.push(symbol.clone());
                }
                info!("pump alert {symbol}: combined score {combined:.1}");
                alerts.push(PumpAlert {
                    id: Uuid::new_v4(),
                    symbol,
                    layer1: entry.layer1,
                    layer2,
                    layer3: result,
                    combined_score: combined,
                    timestamp: now,
                });
            }
        }

        for alert in &alerts {
            self.notifier.pump_alert(alert).await;
        }
        for symbol in watch_candidates {
            self.try_auto_watch(&symbol).await;
        }
        Ok(alerts)
    }

    /// Symbols currently tracked in any layer.
    pub async fn tracked_symbols(&self) -> Vec<String> {
        let state = self.scheduler.lock().await;
        state.states.keys().cloned().collect()
    }

    /// Detection state snapshot for one symbol.
    pub async fn detection_state(&self, symbol: &str) -> Option<DetectionState> {
        let state = self.scheduler.lock().await;
        state.states.get(symbol).cloned()
    }

    async fn screen_symbol(&self, symbol: &str, now: i64) -> Option<Layer1Result> {
        let candles = match self
            .source
            .candles(symbol, Timeframe::M5, self.config.layer1_candle_limit)
            .await
        {
            Ok(candles) => candles,
            Err(e) => {
                debug!("layer 1 fetch failed for {symbol}: {e}");
                return None;
            }
        };
        layer1::pump_score(&candles, self.config.period, now)
    }

    async fn confirm_symbol(
        &self,
        symbol: &str,
        layer1_result: &Layer1Result,
        now: i64,
    ) -> Option<Layer2Result> {
        let h1 = self.fetch_or_none(symbol, Timeframe::H1, self.config.h1_candle_limit).await?;
        let h4 = self.fetch_or_none(symbol, Timeframe::H4, self.config.h4_candle_limit).await?;
        let m5 = self
            .fetch_or_none(symbol, Timeframe::M5, self.config.layer1_candle_limit)
            .await
            .unwrap_or_default();
        let external_pump = self.activity.pump_score(symbol).await;

        layer2::confirm_score(
            &h1,
            &h4,
            &m5,
            external_pump,
            layer1_result,
            self.config.period,
            now,
        )
    }

    async fn evaluate_symbol(&self, symbol: &str, now: i64) -> Option<Layer3Result> {
        let d1 = self
            .fetch_or_none(symbol, Timeframe::D1, self.config.d1_candle_limit)
            .await?;
        layer3::trend_score(&d1, self.config.period, now)
    }

    async fn fetch_or_none(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Option<Vec<Candle>> {
        match self.source.candles(symbol, timeframe, limit).await {
            Ok(candles) if !candles.is_empty() => Some(candles),
            Ok(_) => None,
            Err(e) => {
                debug!("fetch failed for {symbol} {}: {e}", timeframe.code());
                None
            }
        }
    }

    /// Weighted combination of the three normalized layer scores on a
    /// 0-100 scale. Scales and weights are configuration, not derived.
    fn combined_score(&self, layer1: f64, layer2: f64, layer3: f64) -> f64 {
        (layer1 / self.config.layer1_scale * self.config.layer1_weight
            + layer2 / self.config.layer2_scale * self.config.layer2_weight
            + layer3 / self.config.layer3_scale * self.config.layer3_weight)
            * 100.0
    }

    async fn try_auto_watch(&self, symbol: &str) {
        if self.watchlist.count().await >= self.config.watchlist_max {
            debug!("watchlist full, not auto-adding {symbol}");
            return;
        }
        if self.watchlist.add(symbol).await {
            info!("auto-added {symbol} to watchlist");
        }
    }
}
