use std::sync::Arc;

use specter::config::Config;
use specter::services::{
    MarketScanner, MemoryWatchlist, NoActivityDetector, StagedPumpDetector, TracingNotifier,
};
use specter::sources::BinanceMarketData;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "specter=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load and validate configuration; refuse to start half-configured.
    let config = Config::from_env();
    config.validate()?;
    info!(
        "starting specter against {} ({} universe)",
        config.api_base_url, config.quote_asset
    );

    // One provider client serves both candle and universe lookups.
    let market_data = Arc::new(BinanceMarketData::new(&config));
    let activity = Arc::new(NoActivityDetector);
    let notifier = Arc::new(TracingNotifier);
    let watchlist = Arc::new(MemoryWatchlist::new(config.detector.watchlist_max));

    let scanner = Arc::new(MarketScanner::new(
        market_data.clone(),
        market_data.clone(),
        activity.clone(),
        notifier.clone(),
        config.scanner.clone(),
        config.consensus.clone(),
    )?);

    let detector = Arc::new(StagedPumpDetector::new(
        market_data.clone(),
        market_data,
        activity,
        notifier,
        watchlist,
        config.detector.clone(),
    )?);

    let scanner_task = {
        let scanner = scanner.clone();
        tokio::spawn(async move { scanner.start().await })
    };
    let detector_task = {
        let detector = detector.clone();
        tokio::spawn(async move { detector.start().await })
    };

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");

    scanner.stop();
    detector.stop();
    let _ = tokio::time::timeout(
        tokio::time::Duration::from_secs(10),
        futures_util::future::join(scanner_task, detector_task),
    )
    .await;

    info!("specter stopped");
    Ok(())
}
