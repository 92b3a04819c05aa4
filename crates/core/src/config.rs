use std::collections::HashSet;
use std::time::Duration;

use tickerboard_market_data::{Credential, Symbol, TICKER_SERIES_LIMIT};

use crate::errors::{Error, Result};

/// Default delay between the first fetches of consecutive tickers.
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(1000);

/// Settings for a [`Dashboard`](crate::Dashboard).
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    /// Tracked symbols; the position is the stagger index.
    pub symbols: Vec<Symbol>,

    /// Delay between consecutive tickers' first fetches.
    pub stagger: Duration,

    /// Points kept on each ticker card.
    pub series_limit: usize,

    /// Re-apply the stagger when the credential changes instead of
    /// refetching every ticker at once.
    pub stagger_credential_refresh: bool,

    pub initial_credential: Credential,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            symbols: Symbol::ALL.to_vec(),
            stagger: DEFAULT_STAGGER,
            series_limit: TICKER_SERIES_LIMIT,
            stagger_credential_refresh: false,
            initial_credential: Credential::default(),
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            return Err(Error::InvalidConfigValue(
                "at least one symbol must be tracked".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for symbol in &self.symbols {
            if !seen.insert(*symbol) {
                return Err(Error::InvalidConfigValue(format!(
                    "symbol {} is listed twice",
                    symbol
                )));
            }
        }
        if self.series_limit == 0 {
            return Err(Error::InvalidConfigValue(
                "series limit must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
