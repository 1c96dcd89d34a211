//! Stochastic oscillator over an arbitrary value series.

/// Smoothed %K.
///
/// Raw %K measures the latest value's position within the rolling
/// `k_period` range; a degenerate range (max == min) is defined as the
/// neutral 50 rather than a division by zero. The returned %K is the
/// simple rolling mean of raw %K over `smooth_period`.
pub fn stochastic_k(values: &[f64], k_period: usize, smooth_period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if k_period == 0 || smooth_period == 0 || values.len() < k_period + smooth_period - 1 {
        return out;
    }

    let mut raw = vec![None; values.len()];
    for i in (k_period - 1)..values.len() {
        let window = &values[i + 1 - k_period..=i];
        let lowest = window.iter().copied().fold(f64::INFINITY, f64::min);
        let highest = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        raw[i] = Some(if highest > lowest {
            (values[i] - lowest) / (highest - lowest) * 100.0
        } else {
            50.0
        });
    }

    rolling_mean_into(&raw, smooth_period, &mut out);
    out
}

/// %D signal line: simple rolling mean of %K over `d_period`.
pub fn stochastic_d(k_series: &[Option<f64>], d_period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; k_series.len()];
    if d_period == 0 {
        return out;
    }
    rolling_mean_into(k_series, d_period, &mut out);
    out
}

/// Rolling mean over windows whose every entry is defined.
fn rolling_mean_into(series: &[Option<f64>], window: usize, out: &mut [Option<f64>]) {
    for i in (window - 1)..series.len() {
        let slice = &series[i + 1 - window..=i];
        if slice.iter().all(|v| v.is_some()) {
            let sum: f64 = slice.iter().map(|v| v.unwrap()).sum();
            out[i] = Some(sum / window as f64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stochastic_insufficient_data_all_none() {
        let values = vec![1.0; 10];
        let out = stochastic_k(&values, 14, 3);
        assert!(out.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_stochastic_bounded_0_100() {
        let values: Vec<f64> = (0..50)
            .map(|i| 100.0 + ((i * 11) % 17) as f64 - 8.0)
            .collect();
        for v in stochastic_k(&values, 14, 3).iter().flatten() {
            assert!((0.0..=100.0).contains(v), "%K out of range: {v}");
        }
    }

    #[test]
    fn test_stochastic_flat_series_is_exactly_50() {
        let values = vec![42.0; 30];
        for v in stochastic_k(&values, 14, 3).iter().flatten() {
            assert_eq!(*v, 50.0);
        }
    }

    #[test]
    fn test_stochastic_new_high_is_100() {
        // Strictly rising series: the latest value is always the window max.
        let values: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        let last = stochastic_k(&values, 14, 1).last().copied().flatten().unwrap();
        assert_eq!(last, 100.0);
    }

    #[test]
    fn test_stochastic_d_constant_k_round_trip() {
        let k: Vec<Option<f64>> = vec![Some(25.0); 20];
        let d = stochastic_d(&k, 3);
        assert!(d[..2].iter().all(|v| v.is_none()));
        for v in d[2..].iter() {
            assert_eq!(*v, Some(25.0));
        }
    }

    #[test]
    fn test_stochastic_d_skips_partial_windows() {
        let k = vec![None, Some(10.0), Some(20.0), Some(30.0)];
        let d = stochastic_d(&k, 3);
        assert_eq!(d, vec![None, None, None, Some(20.0)]);
    }
}
