//! Money Flow Index.

use crate::types::Candle;

use super::price::hlc3;

/// Volume-weighted RSI analogue over a trailing rolling window.
///
/// Raw money flow for each bar is typical price x volume, signed by the
/// typical-price delta; positive and negative flow are summed over the
/// last `period` deltas. A zero negative sum means fully bullish (100).
/// The first defined index is `period`.
pub fn mfi(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; candles.len()];
    if period == 0 || candles.len() < period + 1 {
        return out;
    }

    // flows[i] is the signed flow between bars i and i+1.
    let flows: Vec<(f64, f64)> = candles
        .windows(2)
        .map(|pair| {
            let prev_tp = hlc3(&pair[0]);
            let tp = hlc3(&pair[1]);
            let raw = tp * pair[1].volume;
            if tp > prev_tp {
                (raw, 0.0)
            } else if tp < prev_tp {
                (0.0, raw)
            } else {
                (0.0, 0.0)
            }
        })
        .collect();

    for i in period..candles.len() {
        let window = &flows[i - period..i];
        let positive: f64 = window.iter().map(|f| f.0).sum();
        let negative: f64 = window.iter().map(|f| f.1).sum();

        let value = if negative == 0.0 {
            100.0
        } else {
            let ratio = positive / negative;
            100.0 - (100.0 / (1.0 + ratio))
        };
        out[i] = Some(value);
    }

    out
}
