//! Consensus analyzer integration tests against a mock candle source.

mod common;

use std::sync::Arc;

use common::{downtrend, uptrend, MockCandleSource};
use specter::config::{ConsensusConfig, SecondaryOscillator};
use specter::services::ConsensusAnalyzer;
use specter::types::{SignalDirection, Timeframe};

const ALL_TIMEFRAMES: [Timeframe; 4] =
    [Timeframe::M5, Timeframe::H1, Timeframe::H4, Timeframe::D1];

fn analyzer(source: MockCandleSource) -> ConsensusAnalyzer {
    ConsensusAnalyzer::new(Arc::new(source), ConsensusConfig::default())
}

#[tokio::test]
async fn test_unanimous_oversold_is_strong_buy() {
    let mut source = MockCandleSource::new();
    for tf in ALL_TIMEFRAMES {
        source.insert("DIPUSDT", tf, downtrend(40, 300.0, 1.0, 1000.0));
    }
    let analyzer = analyzer(source);

    let result = analyzer.analyze("DIPUSDT", &ALL_TIMEFRAMES).await.unwrap();
    assert_eq!(result.consensus, SignalDirection::Buy);
    assert_eq!(result.strength, 4);
    assert!(analyzer.qualifies(&result));
    for signal in &result.signals {
        assert_eq!(signal.signal, SignalDirection::Buy);
        assert!(signal.rsi < 30.0);
        assert!(signal.secondary < 20.0);
        assert!(signal.delta < 0.0);
    }
}

#[tokio::test]
async fn test_missing_timeframes_shrink_but_do_not_fail() {
    let mut source = MockCandleSource::new();
    // Only two of four timeframes have history.
    source.insert("DIPUSDT", Timeframe::H1, downtrend(40, 300.0, 1.0, 1000.0));
    source.insert("DIPUSDT", Timeframe::D1, downtrend(40, 300.0, 1.0, 1000.0));
    let analyzer = analyzer(source);

    let result = analyzer.analyze("DIPUSDT", &ALL_TIMEFRAMES).await.unwrap();
    assert_eq!(result.signals.len(), 2);
    assert_eq!(result.consensus, SignalDirection::Buy);
    assert_eq!(result.strength, 2);
    // Two agreeing timeframes is exactly the qualification floor.
    assert!(analyzer.qualifies(&result));
}

#[tokio::test]
async fn test_no_data_at_all_yields_none() {
    let analyzer = analyzer(MockCandleSource::new());
    assert!(analyzer.analyze("GHOSTUSDT", &ALL_TIMEFRAMES).await.is_none());
}

#[tokio::test]
async fn test_single_timeframe_is_below_qualification_floor() {
    let mut source = MockCandleSource::new();
    source.insert("DIPUSDT", Timeframe::H1, downtrend(40, 300.0, 1.0, 1000.0));
    let analyzer = analyzer(source);

    let result = analyzer.analyze("DIPUSDT", &ALL_TIMEFRAMES).await.unwrap();
    assert_eq!(result.strength, 1);
    assert!(!analyzer.qualifies(&result));
}

#[tokio::test]
async fn test_stochastic_secondary_reaches_same_call() {
    let mut source = MockCandleSource::new();
    for tf in ALL_TIMEFRAMES {
        source.insert("DIPUSDT", tf, downtrend(40, 300.0, 1.0, 1000.0));
    }
    let config = ConsensusConfig {
        secondary: SecondaryOscillator::Stochastic,
        ..ConsensusConfig::default()
    };
    let analyzer = ConsensusAnalyzer::new(Arc::new(source), config);

    let result = analyzer.analyze("DIPUSDT", &ALL_TIMEFRAMES).await.unwrap();
    assert_eq!(result.consensus, SignalDirection::Buy);
    assert_eq!(result.strength, 4);
    for signal in &result.signals {
        // Every bar sets a new low, so %K sits on the floor.
        assert_eq!(signal.secondary, 0.0);
    }
}

#[tokio::test]
async fn test_opposing_timeframes_cancel_out() {
    let mut source = MockCandleSource::new();
    source.insert("MIXUSDT", Timeframe::M5, downtrend(40, 300.0, 1.0, 1000.0));
    source.insert("MIXUSDT", Timeframe::H1, uptrend(40, 100.0, 1.0, 1000.0));
    source.insert("MIXUSDT", Timeframe::H4, downtrend(40, 300.0, 1.0, 1000.0));
    source.insert("MIXUSDT", Timeframe::D1, uptrend(40, 100.0, 1.0, 1000.0));
    let analyzer = analyzer(source);

    let result = analyzer.analyze("MIXUSDT", &ALL_TIMEFRAMES).await.unwrap();
    assert_eq!(result.consensus, SignalDirection::Neutral);
    assert_eq!(result.total_signal, 0);
    assert_eq!(result.strength, 0);
    assert!(!analyzer.qualifies(&result));
}
