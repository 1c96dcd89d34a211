use serde::{Deserialize, Serialize};

/// Candle timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    /// Parse from an interval code.
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "5m" => Some(Timeframe::M5),
            "1h" => Some(Timeframe::H1),
            "4h" => Some(Timeframe::H4),
            "1d" => Some(Timeframe::D1),
            _ => None,
        }
    }

    /// Interval code used by the provider API.
    pub fn code(&self) -> &'static str {
        match self {
            Timeframe::M5 => "5m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        }
    }

    /// Bar duration in seconds.
    pub fn seconds(&self) -> i64 {
        match self {
            Timeframe::M5 => 300,
            Timeframe::H1 => 3600,
            Timeframe::H4 => 14400,
            Timeframe::D1 => 86400,
        }
    }
}

/// A single OHLCV bar. Immutable once fetched; series are ordered by
/// `open_time` ascending with no duplicates per (symbol, timeframe).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time, unix milliseconds.
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Whether the bar closed above its open.
    pub fn is_green(&self) -> bool {
        self.close > self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_codes_round_trip() {
        for tf in [Timeframe::M5, Timeframe::H1, Timeframe::H4, Timeframe::D1] {
            assert_eq!(Timeframe::from_code(tf.code()), Some(tf));
        }
        assert_eq!(Timeframe::from_code("15m"), None);
    }

    #[test]
    fn test_timeframe_seconds() {
        assert_eq!(Timeframe::M5.seconds(), 300);
        assert_eq!(Timeframe::D1.seconds(), 86400);
    }

    #[test]
    fn test_candle_is_green() {
        let candle = Candle {
            open_time: 0,
            open: 100.0,
            high: 103.0,
            low: 99.0,
            close: 102.0,
            volume: 10.0,
        };
        assert!(candle.is_green());

        let red = Candle { close: 99.5, ..candle };
        assert!(!red.is_green());
    }
}
