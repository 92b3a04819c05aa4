use std::sync::Arc;

use tickerboard_core::Dashboard;
use tickerboard_market_data::{AlphaVantageClient, MarketDataClient};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub fn init_tracing() {
    let log_format =
        std::env::var("TICKERBOARD_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so they do not interleave with board output.
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

pub fn build_dashboard(config: &Config) -> anyhow::Result<Dashboard> {
    let client: Arc<dyn MarketDataClient> =
        Arc::new(AlphaVantageClient::with_config(config.provider()));
    tracing::info!(
        "Using {} at {} ({})",
        client.id(),
        config.base_url,
        if config.api_key.is_default() {
            "default key"
        } else {
            "user key"
        }
    );
    let dashboard = Dashboard::new(client, config.dashboard())?;
    Ok(dashboard)
}
