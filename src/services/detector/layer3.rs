//! Layer 3: daily trend-safety evaluation. Ungated; once a symbol is
//! confirmed this always produces a result when daily history exists.

use crate::types::{Candle, Layer3Result};

use crate::services::indicators::{last_value, mfi, ohlc4, rsi};

const RSI_HEADROOM_CAP: f64 = 25.0;
const RANGE_POSITION_CAP: f64 = 25.0;
const TREND_CAP: f64 = 20.0;
const MFI_HEADROOM_CAP: f64 = 20.0;

/// Days in the high/low range window.
const RANGE_WINDOW: usize = 30;
/// Days in the trend-magnitude window.
const TREND_WINDOW: usize = 7;

/// Trend-safety score on a 0-90 scale. Daily RSI runs on the OHLC/4
/// transform rather than the raw close.
pub fn trend_score(d1: &[Candle], period: usize, now: i64) -> Option<Layer3Result> {
    let rsi_d1 = last_value(&rsi(&ohlc4(d1), period))?;
    let closes: Vec<f64> = d1.iter().map(|c| c.close).collect();

    let rsi_headroom = rsi_headroom_score(rsi_d1);
    let range_position = range_position_score(d1);
    let trend = trend_magnitude_score(&closes);
    let mfi_headroom = last_value(&mfi(d1, period))
        .map(mfi_headroom_score)
        .unwrap_or(0.0);

    let score = rsi_headroom + range_position + trend + mfi_headroom;

    Some(Layer3Result {
        score,
        rsi_headroom,
        range_position,
        trend,
        mfi_headroom,
        rsi_d1,
        timestamp: now,
    })
}

/// Lower daily RSI leaves more room before the move is exhausted.
fn rsi_headroom_score(rsi_d1: f64) -> f64 {
    if rsi_d1 < 40.0 {
        RSI_HEADROOM_CAP
    } else if rsi_d1 < 55.0 {
        20.0
    } else if rsi_d1 < 65.0 {
        12.0
    } else if rsi_d1 < 75.0 {
        6.0
    } else {
        0.0
    }
}

/// Position of the close inside the trailing 30-day low/high range;
/// near the low scores full headroom, near the high scores none. A
/// degenerate range (flat month) scores half.
fn range_position_score(d1: &[Candle]) -> f64 {
    let window = &d1[d1.len().saturating_sub(RANGE_WINDOW)..];
    let low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let high = window
        .iter()
        .map(|c| c.high)
        .fold(f64::NEG_INFINITY, f64::max);
    if high <= low {
        return RANGE_POSITION_CAP / 2.0;
    }
    let close = window[window.len() - 1].close;
    let position = ((close - low) / (high - low)).clamp(0.0, 1.0);
    (1.0 - position) * RANGE_POSITION_CAP
}

/// 7-day move tiers: an early, moderate climb is the safest backdrop
/// for a pump; a big prior run-up means a late entry.
fn trend_magnitude_score(closes: &[f64]) -> f64 {
    let n = closes.len();
    if n < TREND_WINDOW + 1 {
        return 0.0;
    }
    let anchor = closes[n - 1 - TREND_WINDOW];
    if anchor <= 0.0 {
        return 0.0;
    }
    let pct = (closes[n - 1] / anchor - 1.0) * 100.0;
    if pct <= 0.0 {
        10.0
    } else if pct < 10.0 {
        TREND_CAP
    } else if pct < 25.0 {
        12.0
    } else {
        4.0
    }
}

fn mfi_headroom_score(mfi_d1: f64) -> f64 {
    if mfi_d1 < 50.0 {
        MFI_HEADROOM_CAP
    } else if mfi_d1 < 65.0 {
        14.0
    } else if mfi_d1 < 80.0 {
        8.0
    } else {
        0.0
    }
}
