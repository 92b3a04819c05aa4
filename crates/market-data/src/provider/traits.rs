//! Market data client trait definition.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{Credential, Quote, Series, Snapshot, Symbol};

/// Number of series points kept on a ticker card.
pub const TICKER_SERIES_LIMIT: usize = 20;

/// Trait for the quote/series provider.
///
/// Each call performs exactly one network round trip and never panics on
/// provider output: every failure is returned as a classified
/// [`MarketDataError`].
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use tickerboard_market_data::{Credential, MarketDataClient, MarketDataError, Quote, Series, Symbol};
///
/// struct FixedClient;
///
/// #[async_trait]
/// impl MarketDataClient for FixedClient {
///     fn id(&self) -> &'static str {
///         "FIXED"
///     }
///
///     async fn fetch_quote(&self, symbol: Symbol, _: &Credential) -> Result<Quote, MarketDataError> {
///         Ok(Quote::new(symbol, 100.0, 0.0))
///     }
///
///     async fn fetch_series(&self, _: Symbol, _: &Credential, _: Option<usize>) -> Result<Series, MarketDataError> {
///         Ok(Series::default())
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// Identifier used in log lines, e.g. "ALPHA_VANTAGE".
    fn id(&self) -> &'static str;

    /// Fetch the latest quote for a symbol.
    async fn fetch_quote(
        &self,
        symbol: Symbol,
        credential: &Credential,
    ) -> Result<Quote, MarketDataError>;

    /// Fetch the intraday close series for a symbol.
    ///
    /// The series is ascending; with `limit` only the most recent `limit`
    /// points are kept.
    async fn fetch_series(
        &self,
        symbol: Symbol,
        credential: &Credential,
        limit: Option<usize>,
    ) -> Result<Series, MarketDataError>;

    /// Run one ticker refresh cycle: quote, then series.
    ///
    /// The series request is only issued once the quote succeeded. The first
    /// error ends the cycle and nothing fetched in it is returned.
    async fn fetch_snapshot(
        &self,
        symbol: Symbol,
        credential: &Credential,
        series_limit: usize,
    ) -> Result<Snapshot, MarketDataError> {
        let quote = self.fetch_quote(symbol, credential).await?;
        let series = self
            .fetch_series(symbol, credential, Some(series_limit))
            .await?;
        Ok(Snapshot { quote, series })
    }
}
