//! Relative Strength Index over an arbitrary value series.

/// Wilder-smoothed RSI.
///
/// Seed averages are the simple mean of the first `period` gains and
/// losses; every later bar folds in with `avg = (avg*(period-1) + x) /
/// period`, Wilder's RMA (an EWMA with alpha = 1/period and no bias
/// adjustment). The first defined index is `period`; anything shorter
/// than `period + 1` values yields an all-`None` series.
pub fn rsi(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period + 1 {
        return out;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let change = values[i] - values[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss += -change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    for i in (period + 1)..values.len() {
        let change = values[i] - values[i - 1];
        let (gain, loss) = if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
        out[i] = Some(rsi_value(avg_gain, avg_loss));
    }

    out
}

/// RSI from smoothed averages. A zero average loss means fully bullish
/// (100), not a division error.
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising(count: usize) -> Vec<f64> {
        (0..count).map(|i| 100.0 + i as f64).collect()
    }

    fn falling(count: usize) -> Vec<f64> {
        (0..count).map(|i| 200.0 - i as f64).collect()
    }

    #[test]
    fn test_rsi_insufficient_data_all_none() {
        let out = rsi(&rising(14), 14);
        assert_eq!(out.len(), 14);
        assert!(out.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_rsi_warmup_prefix_is_none() {
        let out = rsi(&rising(30), 14);
        assert!(out[..14].iter().all(|v| v.is_none()));
        assert!(out[14..].iter().all(|v| v.is_some()));
    }

    #[test]
    fn test_rsi_zero_losses_is_100_everywhere() {
        let out = rsi(&rising(40), 14);
        for v in out.iter().flatten() {
            assert_eq!(*v, 100.0);
        }
    }

    #[test]
    fn test_rsi_zero_gains_is_0_everywhere() {
        let out = rsi(&falling(40), 14);
        for v in out.iter().flatten() {
            assert_eq!(*v, 0.0);
        }
    }

    #[test]
    fn test_rsi_bounded_0_100() {
        let mixed: Vec<f64> = (0..60)
            .map(|i| 100.0 + ((i * 7) % 13) as f64 - 6.0)
            .collect();
        for v in rsi(&mixed, 14).iter().flatten() {
            assert!((0.0..=100.0).contains(v), "RSI out of range: {v}");
        }
    }

    #[test]
    fn test_rsi_translation_invariant() {
        let base: Vec<f64> = (0..50)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0)
            .collect();
        let shifted: Vec<f64> = base.iter().map(|v| v + 250.0).collect();

        let a = rsi(&base, 14);
        let b = rsi(&shifted, 14);
        for (x, y) in a.iter().zip(b.iter()) {
            match (x, y) {
                (Some(x), Some(y)) => assert!((x - y).abs() < 1e-6),
                (None, None) => {}
                _ => panic!("alignment mismatch"),
            }
        }
    }

    #[test]
    fn test_rsi_uptrend_above_downtrend() {
        let mut up: Vec<f64> = rising(20);
        up.extend((0..20).map(|i| 119.0 + ((i % 3) as f64 - 1.0)));
        let mut down: Vec<f64> = falling(20);
        down.extend((0..20).map(|i| 181.0 + ((i % 3) as f64 - 1.0)));

        let up_last = rsi(&up, 14).last().copied().flatten().unwrap();
        let down_last = rsi(&down, 14).last().copied().flatten().unwrap();
        assert!(up_last > down_last);
    }
}
