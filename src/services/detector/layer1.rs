//! Layer 1: fast volume/momentum screen on 5-minute candles.

use crate::types::{Candle, Layer1Result};

use crate::services::indicators::rsi;

/// Bars in the momentum window (price change, green fraction).
const MOMENTUM_WINDOW: usize = 5;
/// Bars averaged for the volume baseline, ending where the momentum
/// window begins.
const BASELINE_WINDOW: usize = 20;
/// Bars checked for a monotonic volume increase.
const CONSISTENCY_WINDOW: usize = 4;
/// Bars between the two RSI readings compared for acceleration.
const RSI_LOOKBACK: usize = 3;

const VOLUME_CAP: f64 = 25.0;
const MOMENTUM_CAP: f64 = 25.0;
const GREEN_CAP: f64 = 20.0;
const RSI_CAP: f64 = 20.0;
const CONSISTENCY_BONUS: f64 = 10.0;

/// A volume ratio of this many times baseline (above 1.0) maxes the
/// volume sub-score.
const VOLUME_RATIO_SPAN: f64 = 3.0;
/// A price move of this percent maxes the momentum sub-score.
const MOMENTUM_PCT_SPAN: f64 = 3.0;

/// 0-100 pump score from five independently capped sub-signals.
///
/// Returns `None` on insufficient history or a dead market (zero
/// baseline volume, non-positive anchor price) -- a recoverable
/// no-result, never a panic.
pub fn pump_score(candles: &[Candle], period: usize, now: i64) -> Option<Layer1Result> {
    let n = candles.len();
    let min_len = (MOMENTUM_WINDOW + BASELINE_WINDOW).max(period + RSI_LOOKBACK + 1);
    if n < min_len {
        return None;
    }

    // Volume spike: last bar vs the average before the move started.
    let baseline_slice = &candles[n - MOMENTUM_WINDOW - BASELINE_WINDOW..n - MOMENTUM_WINDOW];
    let baseline: f64 =
        baseline_slice.iter().map(|c| c.volume).sum::<f64>() / BASELINE_WINDOW as f64;
    if baseline <= 0.0 {
        return None;
    }
    let volume_ratio = candles[n - 1].volume / baseline;
    let volume_spike = ((volume_ratio - 1.0) / VOLUME_RATIO_SPAN * VOLUME_CAP).clamp(0.0, VOLUME_CAP);

    // Price momentum over the window.
    let anchor = candles[n - 1 - MOMENTUM_WINDOW].close;
    if anchor <= 0.0 {
        return None;
    }
    let price_change_pct = (candles[n - 1].close / anchor - 1.0) * 100.0;
    let momentum =
        (price_change_pct / MOMENTUM_PCT_SPAN * MOMENTUM_CAP).clamp(0.0, MOMENTUM_CAP);

    // Fraction of recent bars that closed green.
    let green_count = candles[n - MOMENTUM_WINDOW..]
        .iter()
        .filter(|c| c.is_green())
        .count();
    let green_fraction = green_count as f64 / MOMENTUM_WINDOW as f64 * GREEN_CAP;

    // Short-horizon RSI acceleration.
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let rsi_series = rsi(&closes, period);
    let rsi_rise = match (rsi_series[n - 1], rsi_series[n - 1 - RSI_LOOKBACK]) {
        (Some(now_v), Some(prev_v)) => (now_v - prev_v).clamp(0.0, RSI_CAP),
        _ => 0.0,
    };

    // Monotonic volume build-up across the most recent bars.
    let tail = &candles[n - CONSISTENCY_WINDOW..];
    let monotonic = tail.windows(2).all(|pair| pair[1].volume > pair[0].volume);
    let volume_consistency = if monotonic { CONSISTENCY_BONUS } else { 0.0 };

    let score = volume_spike + momentum + green_fraction + rsi_rise + volume_consistency;

    Some(Layer1Result {
        score,
        volume_spike,
        momentum,
        green_fraction,
        rsi_rise,
        volume_consistency,
        price_change_pct,
        volume_ratio,
        timestamp: now,
    })
}
