//! Smoothed price transforms used as oscillator inputs.

use crate::types::Candle;

/// (H+L+C+C)/4 series. Weights the close double to track momentum while
/// still damping wick noise.
pub fn hlcc4(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .map(|c| (c.high + c.low + c.close + c.close) / 4.0)
        .collect()
}

/// (O+H+L+C)/4 series.
pub fn ohlc4(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .map(|c| (c.open + c.high + c.low + c.close) / 4.0)
        .collect()
}

/// Typical price (H+L+C)/3 for a single bar.
pub fn hlc3(candle: &Candle) -> f64 {
    (candle.high + candle.low + candle.close) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            open_time: 0,
            open,
            high,
            low,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn test_hlcc4_double_weights_close() {
        let series = hlcc4(&[candle(10.0, 12.0, 8.0, 11.0)]);
        assert_eq!(series, vec![(12.0 + 8.0 + 11.0 + 11.0) / 4.0]);
    }

    #[test]
    fn test_ohlc4_averages_all_four() {
        let series = ohlc4(&[candle(10.0, 12.0, 8.0, 11.0)]);
        assert_eq!(series, vec![(10.0 + 12.0 + 8.0 + 11.0) / 4.0]);
    }

    #[test]
    fn test_hlc3_typical_price() {
        assert_eq!(hlc3(&candle(10.0, 12.0, 8.0, 10.0)), 10.0);
    }
}
