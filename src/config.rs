use std::env;

use crate::error::{AppError, Result};

/// Second oscillator paired with RSI in the per-timeframe vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryOscillator {
    Mfi,
    Stochastic,
}

/// Multi-timeframe consensus tuning.
#[derive(Debug, Clone)]
pub struct ConsensusConfig {
    /// RSI oversold threshold (bullish vote below this).
    pub rsi_lower: f64,
    /// RSI overbought threshold (bearish vote above this).
    pub rsi_upper: f64,
    /// Which oscillator votes alongside RSI.
    pub secondary: SecondaryOscillator,
    /// Secondary-oscillator oversold threshold.
    pub secondary_lower: f64,
    /// Secondary-oscillator overbought threshold.
    pub secondary_upper: f64,
    /// Oscillator lookback period.
    pub period: usize,
    /// Stochastic %K smoothing window (when the secondary is Stochastic).
    pub stoch_smooth: usize,
    /// Candles fetched per timeframe.
    pub candle_limit: usize,
    /// Minimum consensus strength (agreeing timeframes) to qualify.
    pub min_strength: u32,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            rsi_lower: 30.0,
            rsi_upper: 70.0,
            secondary: SecondaryOscillator::Mfi,
            secondary_lower: 20.0,
            secondary_upper: 80.0,
            period: 14,
            stoch_smooth: 3,
            candle_limit: 100,
            min_strength: 2,
        }
    }
}

/// Market scanner tuning (1-day statistical extremes).
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Seconds between full-universe scans.
    pub interval_secs: u64,
    /// RSI at or above this flags an overbought extreme.
    pub rsi_upper: f64,
    /// RSI at or below this flags an oversold extreme.
    pub rsi_lower: f64,
    /// RSI/MFI lookback period.
    pub period: usize,
    /// Daily candles fetched per symbol.
    pub candle_limit: usize,
    /// Per-symbol alert cooldown in seconds.
    pub cooldown_secs: i64,
    /// Bounded worker-pool width for per-symbol analysis.
    pub max_concurrency: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 900,
            rsi_upper: 80.0,
            rsi_lower: 20.0,
            period: 14,
            candle_limit: 60,
            cooldown_secs: 3600,
            max_concurrency: 10,
        }
    }
}

impl ScannerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            return Err(AppError::Configuration(
                "scanner interval must be positive".into(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(AppError::Configuration(
                "scanner concurrency must be positive".into(),
            ));
        }
        if self.rsi_lower >= self.rsi_upper {
            return Err(AppError::Configuration(format!(
                "scanner RSI thresholds inverted: {} >= {}",
                self.rsi_lower, self.rsi_upper
            )));
        }
        Ok(())
    }
}

/// Staged pump detector tuning.
///
/// The layer scales (100/90/90) and weights (0.3/0.4/0.3) are empirical
/// constants carried over from live tuning; nothing derives them.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Scheduler granularity in seconds.
    pub tick_secs: u64,
    /// Seconds between Layer 1 screens.
    pub layer1_interval_secs: i64,
    /// Seconds between Layer 2 confirmations.
    pub layer2_interval_secs: i64,
    /// Seconds between Layer 3 trend evaluations.
    pub layer3_interval_secs: i64,
    /// Layer 1 pump score required to flag a symbol (0-100 scale).
    pub layer1_threshold: f64,
    /// Layer 2 confirmation score required to promote (0-90 scale).
    pub layer2_threshold: f64,
    /// Combined score required to alert (0-100 scale).
    pub final_threshold: f64,
    /// Seconds a flagged symbol may wait for confirmation before eviction.
    pub pending_timeout_secs: i64,
    /// Seconds between final alerts for the same symbol.
    pub alert_cooldown_secs: i64,
    /// Combined score at which the symbol is auto-added to the watchlist.
    pub auto_watch_threshold: f64,
    /// Maximum watchlist size respected before auto-adding.
    pub watchlist_max: usize,
    /// Normalization denominator for the Layer 1 score.
    pub layer1_scale: f64,
    /// Normalization denominator for the Layer 2 score.
    pub layer2_scale: f64,
    /// Normalization denominator for the Layer 3 score.
    pub layer3_scale: f64,
    /// Weight of the normalized Layer 1 score in the combined score.
    pub layer1_weight: f64,
    /// Weight of the normalized Layer 2 score.
    pub layer2_weight: f64,
    /// Weight of the normalized Layer 3 score.
    pub layer3_weight: f64,
    /// RSI/MFI lookback period used by the layer formulas.
    pub period: usize,
    /// 5m candles fetched for Layer 1.
    pub layer1_candle_limit: usize,
    /// 1h candles fetched for Layer 2.
    pub h1_candle_limit: usize,
    /// 4h candles fetched for Layer 2.
    pub h4_candle_limit: usize,
    /// Daily candles fetched for Layer 3.
    pub d1_candle_limit: usize,
    /// Bounded worker-pool width for per-symbol analysis.
    pub max_concurrency: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            tick_secs: 30,
            layer1_interval_secs: 180,
            layer2_interval_secs: 600,
            layer3_interval_secs: 900,
            layer1_threshold: 60.0,
            layer2_threshold: 70.0,
            final_threshold: 80.0,
            pending_timeout_secs: 1800,
            alert_cooldown_secs: 1800,
            auto_watch_threshold: 85.0,
            watchlist_max: 50,
            layer1_scale: 100.0,
            layer2_scale: 90.0,
            layer3_scale: 90.0,
            layer1_weight: 0.3,
            layer2_weight: 0.4,
            layer3_weight: 0.3,
            period: 14,
            layer1_candle_limit: 48,
            h1_candle_limit: 48,
            h4_candle_limit: 60,
            d1_candle_limit: 40,
            max_concurrency: 10,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tick_secs == 0 {
            return Err(AppError::Configuration(
                "detector tick must be positive".into(),
            ));
        }
        if self.layer1_interval_secs <= 0
            || self.layer2_interval_secs <= 0
            || self.layer3_interval_secs <= 0
        {
            return Err(AppError::Configuration(
                "layer intervals must be positive".into(),
            ));
        }
        if self.pending_timeout_secs <= 0 {
            return Err(AppError::Configuration(
                "pending timeout must be positive".into(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(AppError::Configuration(
                "detector concurrency must be positive".into(),
            ));
        }
        if self.layer1_scale <= 0.0 || self.layer2_scale <= 0.0 || self.layer3_scale <= 0.0 {
            return Err(AppError::Configuration(
                "layer scales must be positive".into(),
            ));
        }
        let weight_sum = self.layer1_weight + self.layer2_weight + self.layer3_weight;
        if (weight_sum - 1.0).abs() > 0.01 {
            return Err(AppError::Configuration(format!(
                "layer weights must sum to 1.0, got {weight_sum}"
            )));
        }
        Ok(())
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Market-data REST base URL.
    pub api_base_url: String,
    /// Quote asset the symbol universe is filtered to.
    pub quote_asset: String,
    /// Symbols containing any of these substrings are excluded
    /// (leveraged-token tickers and similar).
    pub exclude_keywords: Vec<String>,
    /// Minimum 24h quote volume for a symbol to enter the universe.
    pub min_quote_volume: f64,
    /// Minimum spacing between provider requests, in milliseconds.
    pub request_spacing_ms: u64,
    /// Candle response cache TTL in seconds.
    pub candle_cache_secs: u64,
    pub consensus: ConsensusConfig,
    pub scanner: ScannerConfig,
    pub detector: DetectorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.binance.com/api/v3".to_string(),
            quote_asset: "USDT".to_string(),
            exclude_keywords: vec![
                "UP".to_string(),
                "DOWN".to_string(),
                "BULL".to_string(),
                "BEAR".to_string(),
            ],
            min_quote_volume: 1_000_000.0,
            request_spacing_ms: 100,
            candle_cache_secs: 60,
            consensus: ConsensusConfig::default(),
            scanner: ScannerConfig::default(),
            detector: DetectorConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("SPECTER_API_BASE_URL") {
            config.api_base_url = url;
        }
        if let Ok(quote) = env::var("SPECTER_QUOTE_ASSET") {
            config.quote_asset = quote;
        }
        if let Ok(keywords) = env::var("SPECTER_EXCLUDE_KEYWORDS") {
            config.exclude_keywords = keywords
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
        }
        config.min_quote_volume = env_parse("SPECTER_MIN_QUOTE_VOLUME", config.min_quote_volume);
        config.request_spacing_ms = env_parse("SPECTER_REQUEST_SPACING_MS", config.request_spacing_ms);
        config.candle_cache_secs = env_parse("SPECTER_CANDLE_CACHE_SECS", config.candle_cache_secs);

        config.scanner.interval_secs =
            env_parse("SPECTER_SCAN_INTERVAL_SECS", config.scanner.interval_secs);
        config.scanner.cooldown_secs =
            env_parse("SPECTER_SCAN_COOLDOWN_SECS", config.scanner.cooldown_secs);
        config.scanner.max_concurrency =
            env_parse("SPECTER_SCAN_CONCURRENCY", config.scanner.max_concurrency);

        config.detector.layer1_threshold =
            env_parse("SPECTER_LAYER1_THRESHOLD", config.detector.layer1_threshold);
        config.detector.layer2_threshold =
            env_parse("SPECTER_LAYER2_THRESHOLD", config.detector.layer2_threshold);
        config.detector.final_threshold =
            env_parse("SPECTER_FINAL_THRESHOLD", config.detector.final_threshold);
        config.detector.alert_cooldown_secs = env_parse(
            "SPECTER_ALERT_COOLDOWN_SECS",
            config.detector.alert_cooldown_secs,
        );
        config.detector.max_concurrency =
            env_parse("SPECTER_DETECTOR_CONCURRENCY", config.detector.max_concurrency);

        config
    }

    /// Validate the whole configuration tree. Components refuse to start
    /// on a validation failure rather than run half-configured.
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.is_empty() {
            return Err(AppError::Configuration("api_base_url is empty".into()));
        }
        if self.quote_asset.is_empty() {
            return Err(AppError::Configuration("quote_asset is empty".into()));
        }
        self.scanner.validate()?;
        self.detector.validate()?;
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
