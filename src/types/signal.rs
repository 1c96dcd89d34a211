use serde::{Deserialize, Serialize};

use super::Timeframe;

/// Direction of a trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalDirection {
    Buy,
    Sell,
    Neutral,
}

impl SignalDirection {
    /// Map a directional vote (+1/-1/0) to a direction.
    pub fn from_vote(vote: i32) -> Self {
        match vote {
            v if v > 0 => SignalDirection::Buy,
            v if v < 0 => SignalDirection::Sell,
            _ => SignalDirection::Neutral,
        }
    }

    /// The directional vote this signal contributes.
    pub fn vote(&self) -> i32 {
        match self {
            SignalDirection::Buy => 1,
            SignalDirection::Sell => -1,
            SignalDirection::Neutral => 0,
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            SignalDirection::Buy => "Buy",
            SignalDirection::Sell => "Sell",
            SignalDirection::Neutral => "Neutral",
        }
    }
}

/// Signal derived from one oscillator pair at one timeframe. The
/// direction is conjunctive: both oscillators must agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeframeSignal {
    pub timeframe: Timeframe,
    /// Latest RSI value.
    pub rsi: f64,
    /// Latest value of the second oscillator (MFI or stochastic %K).
    pub secondary: f64,
    /// Latest close.
    pub last_close: f64,
    /// Close change over the final bar.
    pub delta: f64,
    pub signal: SignalDirection,
}

/// Multi-timeframe consensus for one symbol. Computed fresh per scan,
/// never mutated; strength is bounded by the number of timeframes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusResult {
    pub symbol: String,
    pub signals: Vec<TimeframeSignal>,
    /// Sum of per-timeframe directional votes.
    pub total_signal: i32,
    pub consensus: SignalDirection,
    /// Number of timeframes agreeing with the overall call.
    pub strength: u32,
    /// Unix timestamp (seconds) when computed.
    pub timestamp: i64,
}
