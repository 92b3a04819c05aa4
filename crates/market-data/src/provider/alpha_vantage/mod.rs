//! Alpha Vantage market data client.
//!
//! Two endpoints are used:
//! - GLOBAL_QUOTE for the latest price and change percent
//! - TIME_SERIES_INTRADAY (5min interval) for close series
//!
//! Note: Alpha Vantage signals rate limiting through an "Information" or
//! "Note" field in a 200 response rather than through HTTP status codes.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::{classifier, MarketDataError};
use crate::models::{Credential, Quote, Series, SeriesPoint, Symbol};
use crate::provider::MarketDataClient;

const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";
const PROVIDER_ID: &str = "ALPHA_VANTAGE";
const INTRADAY_INTERVAL: &str = "5min";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`AlphaVantageClient`].
#[derive(Clone, Debug)]
pub struct AlphaVantageConfig {
    /// Scheme and host, without the `/query` path.
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Alpha Vantage client.
///
/// The credential is passed per call, so one client serves every credential
/// the session goes through.
pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
}

// ============================================================================
// Response structures for Alpha Vantage API
// ============================================================================

/// Error fields shared by every endpoint.
#[derive(Debug, Default, Deserialize)]
struct ApiNotice {
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
}

/// GLOBAL_QUOTE response
#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    quote: Option<GlobalQuote>,
    #[serde(flatten)]
    notice: ApiNotice,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "10. change percent")]
    change_percent: Option<String>,
}

/// TIME_SERIES_INTRADAY response
#[derive(Debug, Deserialize)]
struct IntradayResponse {
    #[serde(rename = "Time Series (5min)")]
    time_series: Option<HashMap<String, IntradayBar>>,
    #[serde(flatten)]
    notice: ApiNotice,
}

#[derive(Debug, Deserialize)]
struct IntradayBar {
    #[serde(rename = "4. close")]
    close: String,
}

impl ApiNotice {
    /// Check for API-level errors in the response.
    ///
    /// "Error Message" wins over "Information", which wins over "Note".
    fn check(&self) -> Result<(), MarketDataError> {
        let message = self
            .error_message
            .as_deref()
            .or(self.information.as_deref())
            .or(self.note.as_deref());

        match message {
            Some(msg) => {
                warn!("Alpha Vantage notice: {}", msg);
                Err(classifier::classify_provider_message(msg))
            }
            None => Ok(()),
        }
    }
}

// ============================================================================
// AlphaVantageClient implementation
// ============================================================================

impl AlphaVantageClient {
    pub fn new() -> Self {
        Self::with_config(AlphaVantageConfig::default())
    }

    pub fn with_config(config: AlphaVantageConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(
                    "Alpha Vantage HTTP client could not be configured ({}); using defaults without the {:?} timeout",
                    e, config.timeout
                );
                Client::new()
            });

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the query URL with the credential appended.
    fn request_url(
        &self,
        params: &[(&str, &str)],
        credential: &Credential,
    ) -> Result<Url, MarketDataError> {
        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", credential.expose()));

        Url::parse_with_params(&format!("{}/query", self.base_url), &all_params).map_err(|e| {
            MarketDataError::ProviderError {
                message: format!("Failed to build URL: {}", e),
            }
        })
    }

    /// Make a request to the Alpha Vantage API and return the raw body.
    async fn fetch(
        &self,
        params: &[(&str, &str)],
        credential: &Credential,
    ) -> Result<String, MarketDataError> {
        let url = self.request_url(params, credential)?;

        debug!(
            "Alpha Vantage request: {}",
            url.as_str().replace(credential.expose(), "***")
        );

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Alpha Vantage transport error: {}", e);
            classifier::connectivity()
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Alpha Vantage returned HTTP {}", status);
            return Err(classifier::classify_http_status(status.as_u16()));
        }

        response.text().await.map_err(|e| {
            warn!("Alpha Vantage body could not be read: {}", e);
            classifier::connectivity()
        })
    }

    /// Parse a GLOBAL_QUOTE body.
    fn parse_quote(symbol: Symbol, body: &str) -> Result<Quote, MarketDataError> {
        let response: GlobalQuoteResponse = serde_json::from_str(body).map_err(|e| {
            warn!("Alpha Vantage quote body is not valid JSON: {}", e);
            classifier::connectivity()
        })?;

        response.notice.check()?;

        let quote = response.quote.ok_or_else(classifier::missing_quote)?;
        let price = quote
            .price
            .as_deref()
            .and_then(Self::parse_number)
            .ok_or_else(classifier::missing_quote)?;
        let change_percent = quote
            .change_percent
            .as_deref()
            .and_then(Self::parse_number)
            .ok_or_else(classifier::missing_quote)?;

        Ok(Quote::new(symbol, price, change_percent))
    }

    /// Parse a TIME_SERIES_INTRADAY body into an ascending series.
    fn parse_series(body: &str, limit: Option<usize>) -> Result<Series, MarketDataError> {
        let response: IntradayResponse = serde_json::from_str(body).map_err(|e| {
            warn!("Alpha Vantage series body is not valid JSON: {}", e);
            classifier::connectivity()
        })?;

        response.notice.check()?;

        let time_series = response.time_series.ok_or_else(classifier::missing_series)?;

        let received = time_series.len();
        let points: Vec<SeriesPoint> = time_series
            .into_iter()
            .filter_map(|(timestamp, bar)| {
                let close = Self::parse_number(&bar.close)?;
                Some(SeriesPoint::new(timestamp, close))
            })
            .collect();
        if points.len() < received {
            warn!(
                "Alpha Vantage series: dropped {} of {} bars with an unreadable close",
                received - points.len(),
                received
            );
        }

        // Provider order is newest first; Series::new sorts ascending.
        let series = Series::new(points);
        Ok(match limit {
            Some(limit) => series.keep_recent(limit),
            None => series,
        })
    }

    /// Parse a decimal string such as "171.4800" or "-0.4567%".
    fn parse_number(s: &str) -> Option<f64> {
        s.trim()
            .trim_end_matches('%')
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }
}

impl Default for AlphaVantageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataClient for AlphaVantageClient {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_quote(
        &self,
        symbol: Symbol,
        credential: &Credential,
    ) -> Result<Quote, MarketDataError> {
        let params = [("function", "GLOBAL_QUOTE"), ("symbol", symbol.as_str())];

        let body = self.fetch(&params, credential).await?;
        let quote = Self::parse_quote(symbol, &body)?;

        debug!(
            "Alpha Vantage: {} quote {} ({}%)",
            symbol, quote.price, quote.change_percent
        );

        Ok(quote)
    }

    async fn fetch_series(
        &self,
        symbol: Symbol,
        credential: &Credential,
        limit: Option<usize>,
    ) -> Result<Series, MarketDataError> {
        let params = [
            ("function", "TIME_SERIES_INTRADAY"),
            ("symbol", symbol.as_str()),
            ("interval", INTRADAY_INTERVAL),
        ];

        let body = self.fetch(&params, credential).await?;
        let series = Self::parse_series(&body, limit)?;

        debug!(
            "Alpha Vantage: fetched {} intraday points for {}",
            series.len(),
            symbol
        );

        Ok(series)
    }
}
