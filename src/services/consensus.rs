//! Directional signal consensus across oscillators and timeframes.

use std::sync::Arc;

use tracing::debug;

use crate::config::{ConsensusConfig, SecondaryOscillator};
use crate::sources::CandleSource;
use crate::types::{ConsensusResult, SignalDirection, Timeframe, TimeframeSignal};

use super::indicators::{hlcc4, last_value, mfi, rsi, stochastic_k};

/// Directional vote for an oscillator value: +1 below the lower
/// threshold (oversold, bullish), -1 above the upper (overbought,
/// bearish), 0 between.
pub fn directional_vote(value: f64, lower: f64, upper: f64) -> i32 {
    if value < lower {
        1
    } else if value > upper {
        -1
    } else {
        0
    }
}

/// Conjunctive pair vote: two independent oscillators at the same
/// timeframe must agree on direction, anything else is neutral.
pub fn pair_signal(first: i32, second: i32) -> i32 {
    if first == 1 && second == 1 {
        1
    } else if first == -1 && second == -1 {
        -1
    } else {
        0
    }
}

/// Fold per-timeframe signals into a single directional consensus.
pub fn multi_timeframe_consensus(symbol: &str, signals: Vec<TimeframeSignal>) -> ConsensusResult {
    let total_signal: i32 = signals.iter().map(|s| s.signal.vote()).sum();
    ConsensusResult {
        symbol: symbol.to_string(),
        signals,
        total_signal,
        consensus: SignalDirection::from_vote(total_signal),
        strength: total_signal.unsigned_abs(),
        timestamp: chrono::Utc::now().timestamp(),
    }
}

/// Builds per-timeframe RSI/MFI signals from a candle source and folds
/// them into a consensus call.
pub struct ConsensusAnalyzer {
    source: Arc<dyn CandleSource>,
    config: ConsensusConfig,
}

impl ConsensusAnalyzer {
    pub fn new(source: Arc<dyn CandleSource>, config: ConsensusConfig) -> Self {
        Self { source, config }
    }

    /// Analyze one symbol across the given timeframes. Timeframes with
    /// insufficient history are skipped (they contribute no vote); a
    /// symbol with no usable timeframe at all yields `None`.
    pub async fn analyze(
        &self,
        symbol: &str,
        timeframes: &[Timeframe],
    ) -> Option<ConsensusResult> {
        let mut signals = Vec::with_capacity(timeframes.len());

        for &timeframe in timeframes {
            match self.timeframe_signal(symbol, timeframe).await {
                Some(signal) => signals.push(signal),
                None => {
                    debug!("{symbol} {}: insufficient data, skipping", timeframe.code());
                }
            }
        }

        if signals.is_empty() {
            return None;
        }
        Some(multi_timeframe_consensus(symbol, signals))
    }

    /// Whether a consensus qualifies for downstream alerting.
    pub fn qualifies(&self, result: &ConsensusResult) -> bool {
        result.consensus != SignalDirection::Neutral && result.strength >= self.config.min_strength
    }

    async fn timeframe_signal(&self, symbol: &str, timeframe: Timeframe) -> Option<TimeframeSignal> {
        let candles = self
            .source
            .candles(symbol, timeframe, self.config.candle_limit)
            .await
            .ok()?;
        if candles.len() < self.config.period + 1 {
            return None;
        }

        let smoothed = hlcc4(&candles);
        let rsi_now = last_value(&rsi(&smoothed, self.config.period))?;
        let secondary_now = match self.config.secondary {
            SecondaryOscillator::Mfi => last_value(&mfi(&candles, self.config.period))?,
            SecondaryOscillator::Stochastic => last_value(&stochastic_k(
                &smoothed,
                self.config.period,
                self.config.stoch_smooth,
            ))?,
        };

        let rsi_vote = directional_vote(rsi_now, self.config.rsi_lower, self.config.rsi_upper);
        let secondary_vote = directional_vote(
            secondary_now,
            self.config.secondary_lower,
            self.config.secondary_upper,
        );
        let vote = pair_signal(rsi_vote, secondary_vote);

        let last_close = candles.last().map(|c| c.close)?;
        let delta = if candles.len() >= 2 {
            last_close - candles[candles.len() - 2].close
        } else {
            0.0
        };

        Some(TimeframeSignal {
            timeframe,
            rsi: rsi_now,
            secondary: secondary_now,
            last_close,
            delta,
            signal: SignalDirection::from_vote(vote),
        })
    }
}
