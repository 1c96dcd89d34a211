use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Layer 1 fast-screen result: a 0-100 pump score built from five
/// independently capped sub-scores on 5-minute candles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer1Result {
    /// Total pump score (0-100).
    pub score: f64,
    /// Volume spike sub-score (0-25).
    pub volume_spike: f64,
    /// Price momentum sub-score (0-25).
    pub momentum: f64,
    /// Green-candle fraction sub-score (0-20).
    pub green_fraction: f64,
    /// Short-horizon RSI rise sub-score (0-20).
    pub rsi_rise: f64,
    /// Monotonic volume increase sub-score (0 or 10).
    pub volume_consistency: f64,
    /// Raw price change over the momentum window, percent.
    pub price_change_pct: f64,
    /// Raw last-volume / baseline-volume ratio.
    pub volume_ratio: f64,
    /// Unix timestamp (seconds) when computed.
    pub timestamp: i64,
}

/// Layer 2 confirmation result on 1h/4h data (0-90 scale).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer2Result {
    /// Total confirmation score (0-90).
    pub score: f64,
    /// 1h RSI momentum-zone sub-score (0-20).
    pub rsi_momentum: f64,
    /// 4h RSI range-healthiness sub-score (0-15).
    pub rsi_range: f64,
    /// 1h MFI zone sub-score (0-15).
    pub mfi_zone: f64,
    /// Sustained 1h volume sub-score (0-15).
    pub sustained_volume: f64,
    /// Externally supplied pump-detector contribution (0-15).
    pub external_pump: f64,
    /// Bonus for Layer 1 momentum still holding (0 or 10).
    pub momentum_bonus: f64,
    /// Latest 1h RSI.
    pub rsi_h1: f64,
    /// Latest 4h RSI.
    pub rsi_h4: f64,
    /// Unix timestamp (seconds) when computed.
    pub timestamp: i64,
}

/// Layer 3 daily trend-safety result (0-90 scale, ungated).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer3Result {
    /// Total trend-safety score (0-90).
    pub score: f64,
    /// Daily RSI headroom sub-score (0-25).
    pub rsi_headroom: f64,
    /// Position within the 30-day low/high range sub-score (0-25).
    pub range_position: f64,
    /// 7-day trend tier sub-score (0-20).
    pub trend: f64,
    /// Daily MFI headroom sub-score (0-20).
    pub mfi_headroom: f64,
    /// Latest daily RSI.
    pub rsi_d1: f64,
    /// Unix timestamp (seconds) when computed.
    pub timestamp: i64,
}

/// Per-symbol evidence accumulated across detector layers. Exists only
/// between Layer 1 flagging and retirement; the detector map holds at
/// most one per symbol.
#[derive(Debug, Clone)]
pub struct DetectionState {
    pub symbol: String,
    pub layer1: Layer1Result,
    /// Unix timestamp (seconds) the symbol was flagged.
    pub layer1_at: i64,
    pub layer2: Option<Layer2Result>,
    pub layer2_at: Option<i64>,
    pub layer3: Option<Layer3Result>,
    pub layer3_at: Option<i64>,
}

impl DetectionState {
    pub fn new(symbol: String, layer1: Layer1Result, now: i64) -> Self {
        Self {
            symbol,
            layer1,
            layer1_at: now,
            layer2: None,
            layer2_at: None,
            layer3: None,
            layer3_at: None,
        }
    }

    /// Flagged by Layer 1, still awaiting confirmation.
    pub fn is_pending_confirmation(&self) -> bool {
        self.layer2.is_none()
    }

    /// Confirmed by Layer 2, awaiting trend evaluation.
    pub fn is_awaiting_trend(&self) -> bool {
        self.layer2.is_some() && self.layer3.is_none()
    }
}

/// Final pump alert delivered to the notifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpAlert {
    pub id: Uuid,
    pub symbol: String,
    pub layer1: Layer1Result,
    pub layer2: Layer2Result,
    pub layer3: Layer3Result,
    /// Weighted combination of the three normalized layer scores (0-100).
    pub combined_score: f64,
    /// Unix timestamp (seconds) of the alert.
    pub timestamp: i64,
}

/// Market-scanner extreme record delivered to the notifier. The scan
/// decision is RSI-only; MFI and activity scores are display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtremeAlert {
    pub symbol: String,
    pub rsi: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfi: Option<f64>,
    /// Human-readable conditions that fired ("overbought", "oversold").
    pub conditions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pump_score: Option<f64>,
    /// Unix timestamp (seconds) of the scan.
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer1_fixture() -> Layer1Result {
        Layer1Result {
            score: 72.0,
            volume_spike: 25.0,
            momentum: 20.0,
            green_fraction: 12.0,
            rsi_rise: 5.0,
            volume_consistency: 10.0,
            price_change_pct: 2.4,
            volume_ratio: 4.1,
            timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn test_detection_state_lifecycle_flags() {
        let mut state = DetectionState::new("ABCUSDT".into(), layer1_fixture(), 1_700_000_000);
        assert!(state.is_pending_confirmation());
        assert!(!state.is_awaiting_trend());

        state.layer2 = Some(Layer2Result {
            score: 75.0,
            rsi_momentum: 20.0,
            rsi_range: 15.0,
            mfi_zone: 15.0,
            sustained_volume: 10.0,
            external_pump: 5.0,
            momentum_bonus: 10.0,
            rsi_h1: 61.0,
            rsi_h4: 55.0,
            timestamp: 1_700_000_600,
        });
        state.layer2_at = Some(1_700_000_600);
        assert!(!state.is_pending_confirmation());
        assert!(state.is_awaiting_trend());
    }

    #[test]
    fn test_extreme_alert_serializes_camel_case() {
        let alert = ExtremeAlert {
            symbol: "ABCUSDT".into(),
            rsi: 84.2,
            mfi: Some(71.0),
            conditions: vec!["overbought".into()],
            bot_score: None,
            pump_score: None,
            timestamp: 1_700_000_000,
        };
        let json = serde_json::to_string(&alert).unwrap();
        assert!(!json.contains("\"botScore\""));
        assert!(json.contains("\"rsi\":84.2"));
        assert!(json.contains("\"conditions\":[\"overbought\"]"));
    }
}
