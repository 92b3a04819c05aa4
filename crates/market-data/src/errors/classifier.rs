//! Deterministic mapping from provider output to [`MarketDataError`].
//!
//! Every function here is pure and total: each input maps to exactly one
//! error kind.

use super::MarketDataError;

/// Shown when a quote response has no price field.
pub const NO_QUOTE_MESSAGE: &str = "No quote data found.";

/// Shown when a series response has no time series collection.
pub const NO_SERIES_MESSAGE: &str = "No historical data found.";

/// Shown for transport failures and unreadable bodies.
pub const CONNECTIVITY_MESSAGE: &str = "Failed to connect to the API.";

/// Phrases the provider uses when a key has exhausted its request quota.
const USAGE_LIMIT_MARKERS: &[&str] = &["rate limit", "api call frequency"];

/// Classify a message found in one of the provider's error fields.
pub fn classify_provider_message(message: &str) -> MarketDataError {
    if is_usage_limit_message(message) {
        MarketDataError::RateLimited {
            message: message.to_string(),
        }
    } else {
        MarketDataError::ProviderError {
            message: message.to_string(),
        }
    }
}

/// Classify a non-2xx HTTP status.
pub fn classify_http_status(status: u16) -> MarketDataError {
    if status == 429 {
        MarketDataError::RateLimited {
            message: format!("HTTP {}: rate limit exceeded", status),
        }
    } else {
        MarketDataError::ProviderError {
            message: format!("HTTP {}", status),
        }
    }
}

pub fn missing_quote() -> MarketDataError {
    MarketDataError::NoData {
        message: NO_QUOTE_MESSAGE.to_string(),
    }
}

pub fn missing_series() -> MarketDataError {
    MarketDataError::NoData {
        message: NO_SERIES_MESSAGE.to_string(),
    }
}

pub fn connectivity() -> MarketDataError {
    MarketDataError::Connectivity {
        message: CONNECTIVITY_MESSAGE.to_string(),
    }
}

fn is_usage_limit_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    USAGE_LIMIT_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}
