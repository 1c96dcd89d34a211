use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    /// Fewer candles than an indicator's minimum window. Recoverable:
    /// the symbol/timeframe is skipped for the current tick only.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Market-data provider failure (network, API). Recoverable: treated
    /// as an empty result, never stops a scan loop.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Unexpected numeric failure in an analysis worker. Recoverable at
    /// per-symbol granularity; must not cross the worker boundary.
    #[error("Computation error: {0}")]
    Computation(String),

    /// Invalid or missing configuration. Fatal at startup only.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_display_messages() {
        assert_eq!(
            AppError::InsufficientData("need 15 candles, have 3".into()).to_string(),
            "Insufficient data: need 15 candles, have 3"
        );
        assert_eq!(
            AppError::Provider("timeout".into()).to_string(),
            "Provider error: timeout"
        );
        assert_eq!(
            AppError::Computation("score was NaN".into()).to_string(),
            "Computation error: score was NaN"
        );
        assert_eq!(
            AppError::Configuration("no candle source".into()).to_string(),
            "Configuration error: no candle source"
        );
    }

    #[test]
    fn test_transparent_conversions() {
        let err: AppError = serde_json::from_str::<i32>("not json").unwrap_err().into();
        assert!(matches!(err, AppError::SerdeJson(_)));

        let err: AppError = anyhow::anyhow!("wrapped").into();
        assert_eq!(err.to_string(), "wrapped");
    }
}
