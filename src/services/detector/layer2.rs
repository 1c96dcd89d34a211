//! Layer 2: mid-timeframe confirmation of a Layer 1 flag.

use crate::types::{Candle, Layer1Result, Layer2Result};

use crate::services::indicators::{last_value, mfi, rsi};

const RSI_MOMENTUM_CAP: f64 = 20.0;
const RSI_RANGE_CAP: f64 = 15.0;
const MFI_ZONE_CAP: f64 = 15.0;
const SUSTAINED_VOLUME_CAP: f64 = 15.0;
const EXTERNAL_PUMP_CAP: f64 = 15.0;
const MOMENTUM_BONUS: f64 = 10.0;

/// Recent 1h bars averaged for the sustained-volume numerator.
const RECENT_VOLUME_WINDOW: usize = 3;
/// Prior 1h bars averaged for the sustained-volume denominator.
const PRIOR_VOLUME_WINDOW: usize = 12;

/// Bars in the 5m momentum re-check window (same as Layer 1).
const MOMENTUM_WINDOW: usize = 5;
const MOMENTUM_PCT_SPAN: f64 = 3.0;
const MOMENTUM_CAP: f64 = 25.0;

/// Confirmation score on a 0-90 scale.
///
/// Requires enough 1h and 4h history for RSI; everything else degrades
/// to a zero contribution instead of failing the symbol.
pub fn confirm_score(
    h1: &[Candle],
    h4: &[Candle],
    m5: &[Candle],
    external_pump: Option<f64>,
    layer1: &Layer1Result,
    period: usize,
    now: i64,
) -> Option<Layer2Result> {
    let h1_closes: Vec<f64> = h1.iter().map(|c| c.close).collect();
    let h4_closes: Vec<f64> = h4.iter().map(|c| c.close).collect();

    let rsi_h1 = last_value(&rsi(&h1_closes, period))?;
    let rsi_h4 = last_value(&rsi(&h4_closes, period))?;

    let rsi_momentum = rsi_momentum_score(rsi_h1);
    let rsi_range = rsi_range_score(rsi_h4);

    let mfi_zone = last_value(&mfi(h1, period))
        .map(mfi_zone_score)
        .unwrap_or(0.0);

    let sustained_volume = sustained_volume_score(h1);

    let external_pump = external_pump
        .map(|s| s.clamp(0.0, 100.0) * EXTERNAL_PUMP_CAP / 100.0)
        .unwrap_or(0.0);

    let momentum_bonus = if momentum_holds(m5, layer1) {
        MOMENTUM_BONUS
    } else {
        0.0
    };

    let score =
        rsi_momentum + rsi_range + mfi_zone + sustained_volume + external_pump + momentum_bonus;

    Some(Layer2Result {
        score,
        rsi_momentum,
        rsi_range,
        mfi_zone,
        sustained_volume,
        external_pump,
        momentum_bonus,
        rsi_h1,
        rsi_h4,
        timestamp: now,
    })
}

/// 1h RSI in a rising-but-not-exhausted zone confirms momentum.
fn rsi_momentum_score(rsi_h1: f64) -> f64 {
    if (55.0..70.0).contains(&rsi_h1) {
        RSI_MOMENTUM_CAP
    } else if (50.0..55.0).contains(&rsi_h1) {
        15.0
    } else if (70.0..80.0).contains(&rsi_h1) {
        10.0
    } else {
        0.0
    }
}

/// 4h RSI inside a healthy band; far outside means the larger trend is
/// either dead or already overextended.
fn rsi_range_score(rsi_h4: f64) -> f64 {
    if (45.0..=70.0).contains(&rsi_h4) {
        RSI_RANGE_CAP
    } else if (40.0..45.0).contains(&rsi_h4) || (70.0..=75.0).contains(&rsi_h4) {
        8.0
    } else {
        0.0
    }
}

fn mfi_zone_score(mfi_h1: f64) -> f64 {
    if (50.0..80.0).contains(&mfi_h1) {
        MFI_ZONE_CAP
    } else if (40.0..50.0).contains(&mfi_h1) {
        8.0
    } else if mfi_h1 >= 80.0 {
        5.0
    } else {
        0.0
    }
}

/// Recent hourly volume vs the hours before it; a doubling maxes out.
fn sustained_volume_score(h1: &[Candle]) -> f64 {
    let n = h1.len();
    if n < RECENT_VOLUME_WINDOW + PRIOR_VOLUME_WINDOW {
        return 0.0;
    }
    let recent: f64 = h1[n - RECENT_VOLUME_WINDOW..]
        .iter()
        .map(|c| c.volume)
        .sum::<f64>()
        / RECENT_VOLUME_WINDOW as f64;
    let prior: f64 = h1[n - RECENT_VOLUME_WINDOW - PRIOR_VOLUME_WINDOW..n - RECENT_VOLUME_WINDOW]
        .iter()
        .map(|c| c.volume)
        .sum::<f64>()
        / PRIOR_VOLUME_WINDOW as f64;
    if prior <= 0.0 {
        return 0.0;
    }
    ((recent / prior - 1.0) * SUSTAINED_VOLUME_CAP).clamp(0.0, SUSTAINED_VOLUME_CAP)
}

/// The original 5m momentum must still run at half strength or better.
fn momentum_holds(m5: &[Candle], layer1: &Layer1Result) -> bool {
    if layer1.momentum <= 0.0 {
        return false;
    }
    let n = m5.len();
    if n < MOMENTUM_WINDOW + 1 {
        return false;
    }
    let anchor = m5[n - 1 - MOMENTUM_WINDOW].close;
    if anchor <= 0.0 {
        return false;
    }
    let pct = (m5[n - 1].close / anchor - 1.0) * 100.0;
    let current = (pct / MOMENTUM_PCT_SPAN * MOMENTUM_CAP).clamp(0.0, MOMENTUM_CAP);
    current >= layer1.momentum / 2.0
}
