//! Market-data provider contracts and implementations.

pub mod binance;

pub use binance::BinanceMarketData;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Candle, Timeframe};

/// Ordered OHLCV series provider.
///
/// Implementations must tolerate unknown symbols (return an empty
/// series, don't error) and downgrade transient provider failures to
/// empty/cached results with a log line. A returned series is ordered
/// by open time ascending with no duplicate open times.
#[async_trait]
pub trait CandleSource: Send + Sync {
    async fn candles(&self, symbol: &str, timeframe: Timeframe, limit: usize)
        -> Result<Vec<Candle>>;
}

/// Filtered, liquidity-ranked universe of tradable symbols.
#[async_trait]
pub trait SymbolUniverse: Send + Sync {
    /// Symbols to scan, ranked by liquidity descending.
    async fn symbols(&self) -> Result<Vec<String>>;
}
