//! Binance REST market-data client: candles + symbol universe.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::types::{Candle, Timeframe};

use super::{CandleSource, SymbolUniverse};

/// Binance 24hr ticker response (the fields we read).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24h {
    symbol: String,
    last_price: String,
    quote_volume: String,
}

struct CachedCandles {
    fetched_at: Instant,
    candles: Vec<Candle>,
}

/// REST client implementing both provider contracts, with a short
/// response cache and minimum inter-request spacing to bound call
/// volume under worker-pool concurrency.
pub struct BinanceMarketData {
    client: Client,
    base_url: String,
    quote_asset: String,
    exclude_keywords: Vec<String>,
    min_quote_volume: f64,
    cache_ttl: Duration,
    candle_cache: DashMap<String, CachedCandles>,
    last_request: Mutex<Option<Instant>>,
    request_spacing: Duration,
}

impl BinanceMarketData {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .user_agent("Specter/1.0")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.api_base_url.clone(),
            quote_asset: config.quote_asset.clone(),
            exclude_keywords: config.exclude_keywords.clone(),
            min_quote_volume: config.min_quote_volume,
            cache_ttl: Duration::from_secs(config.candle_cache_secs),
            candle_cache: DashMap::new(),
            last_request: Mutex::new(None),
            request_spacing: Duration::from_millis(config.request_spacing_ms),
        }
    }

    /// Enforce the minimum spacing between provider requests.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.request_spacing {
                tokio::time::sleep(self.request_spacing - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    fn cache_lookup(&self, key: &str) -> Option<Vec<Candle>> {
        let entry = self.candle_cache.get(key)?;
        if entry.fetched_at.elapsed() < self.cache_ttl {
            Some(entry.candles.clone())
        } else {
            None
        }
    }

    /// Last cached response regardless of age, for provider outages.
    fn cache_lookup_stale(&self, key: &str) -> Option<Vec<Candle>> {
        self.candle_cache.get(key).map(|e| e.candles.clone())
    }
}

#[async_trait]
impl CandleSource for BinanceMarketData {
    async fn candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let key = format!("{symbol}:{}", timeframe.code());
        if let Some(cached) = self.cache_lookup(&key) {
            return Ok(cached);
        }

        self.throttle().await;
        let url = format!(
            "{}/klines?symbol={}&interval={}&limit={}",
            self.base_url,
            symbol,
            timeframe.code(),
            limit
        );

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("klines request failed for {symbol}: {e}");
                return Ok(self.cache_lookup_stale(&key).unwrap_or_default());
            }
        };

        if !response.status().is_success() {
            // Unknown symbols and rate limits both land here; either
            // way the caller just skips this symbol for the tick.
            debug!(
                "klines for {symbol} {} returned {}",
                timeframe.code(),
                response.status()
            );
            return Ok(Vec::new());
        }

        let rows: Vec<Vec<serde_json::Value>> = match response.json().await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("klines decode failed for {symbol}: {e}");
                return Ok(self.cache_lookup_stale(&key).unwrap_or_default());
            }
        };

        let mut candles: Vec<Candle> = rows.iter().filter_map(|row| parse_kline(row)).collect();
        candles.sort_by_key(|c| c.open_time);
        candles.dedup_by_key(|c| c.open_time);

        self.candle_cache.insert(
            key,
            CachedCandles {
                fetched_at: Instant::now(),
                candles: candles.clone(),
            },
        );
        Ok(candles)
    }
}

#[async_trait]
impl SymbolUniverse for BinanceMarketData {
    async fn symbols(&self) -> Result<Vec<String>> {
        self.throttle().await;
        let url = format!("{}/ticker/24hr", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("ticker request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "ticker endpoint returned {}",
                response.status()
            )));
        }
        let tickers: Vec<Ticker24h> = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("ticker decode failed: {e}")))?;

        Ok(filter_universe(
            &tickers,
            &self.quote_asset,
            &self.exclude_keywords,
            self.min_quote_volume,
        ))
    }
}

/// One kline row: `[open_time, open, high, low, close, volume, ...]`
/// with prices and volume as strings.
fn parse_kline(row: &[serde_json::Value]) -> Option<Candle> {
    if row.len() < 6 {
        return None;
    }
    let open_time = row[0].as_i64()?;
    let field = |i: usize| -> Option<f64> { row[i].as_str()?.parse().ok() };

    let candle = Candle {
        open_time,
        open: field(1)?,
        high: field(2)?,
        low: field(3)?,
        close: field(4)?,
        volume: field(5)?,
    };
    if candle.open <= 0.0 || candle.high <= 0.0 || candle.low <= 0.0 || candle.close <= 0.0 {
        return None;
    }
    Some(candle)
}

/// Filter tickers down to the tradable universe: quote-asset match, no
/// excluded keyword in the base asset, minimum 24h quote volume, ranked
/// by quote volume descending.
fn filter_universe(
    tickers: &[Ticker24h],
    quote_asset: &str,
    exclude_keywords: &[String],
    min_quote_volume: f64,
) -> Vec<String> {
    let mut ranked: Vec<(String, f64)> = tickers
        .iter()
        .filter_map(|ticker| {
            let base = ticker.symbol.strip_suffix(quote_asset)?;
            if base.is_empty() {
                return None;
            }
            if exclude_keywords.iter().any(|kw| base.contains(kw.as_str())) {
                return None;
            }
            let price: f64 = ticker.last_price.parse().ok()?;
            if price <= 0.0 {
                return None;
            }
            let quote_volume: f64 = ticker.quote_volume.parse().ok()?;
            if quote_volume < min_quote_volume {
                return None;
            }
            Some((ticker.symbol.clone(), quote_volume))
        })
        .collect();

    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.into_iter().map(|(symbol, _)| symbol).collect()
}
