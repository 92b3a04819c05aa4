//! Entry point wiring the shared containers, the pollers and the detail
//! fetcher together.

use std::sync::Arc;

use log::info;
use tickerboard_market_data::{Credential, ErrorInfo, MarketDataClient, Symbol};
use tokio::sync::watch;

use crate::banner::ErrorBanner;
use crate::config::DashboardConfig;
use crate::credentials::CredentialStore;
use crate::detail::DetailFetcher;
use crate::errors::{Error, Result};
use crate::selection::SelectionController;
use crate::state::{DashboardSnapshot, DetailState, TickerState};
use crate::ticker::{PollerOptions, TickerPoller};

/// The running board: one poller per tracked symbol plus the detail view.
///
/// Dropping the dashboard stops every task it started.
pub struct Dashboard {
    symbols: Vec<Symbol>,
    credentials: CredentialStore,
    selection: SelectionController,
    banner: ErrorBanner,
    tickers: Vec<TickerPoller>,
    detail: DetailFetcher,
}

impl Dashboard {
    /// Start the board. Must be called inside a Tokio runtime.
    pub fn new(client: Arc<dyn MarketDataClient>, config: DashboardConfig) -> Result<Self> {
        config.validate()?;

        let banner = ErrorBanner::new();
        let selection = SelectionController::new(banner.clone());
        let credentials = CredentialStore::new(
            config.initial_credential.clone(),
            selection.clone(),
            banner.clone(),
        );

        let tickers = config
            .symbols
            .iter()
            .enumerate()
            .map(|(index, symbol)| {
                TickerPoller::spawn(
                    *symbol,
                    Arc::clone(&client),
                    &credentials,
                    PollerOptions::from_config(&config, index),
                )
            })
            .collect();
        let detail = DetailFetcher::spawn(
            Arc::clone(&client),
            &credentials,
            &selection,
            banner.clone(),
        );

        info!(
            "Dashboard started: {} symbols via {}, stagger {:?}",
            config.symbols.len(),
            client.id(),
            config.stagger
        );

        Ok(Self {
            symbols: config.symbols,
            credentials,
            selection,
            banner,
            tickers,
            detail,
        })
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Replace the credential; blank input selects the default key. Clears
    /// the selection and page error and restarts every fetch.
    ///
    /// The selection and page error are cleared before this returns. Ticker
    /// and detail state are reset by their own tasks, so a [`ticker`](Self::ticker)
    /// read made right after this call may still show the previous error
    /// until the poller has run.
    pub fn set_credential(&self, raw: &str) -> Credential {
        self.credentials.set_credential(raw)
    }

    pub fn credential(&self) -> Credential {
        self.credentials.current()
    }

    pub fn select(&self, symbol: Symbol) -> Result<()> {
        self.poller(symbol)?;
        self.selection.select(symbol);
        Ok(())
    }

    pub fn clear_selection(&self) {
        self.selection.clear();
    }

    pub fn selected(&self) -> Option<Symbol> {
        self.selection.current()
    }

    /// Manually refresh one ticker card.
    pub fn refresh(&self, symbol: Symbol) -> Result<()> {
        self.poller(symbol)?.refresh();
        Ok(())
    }

    pub fn refresh_detail(&self) {
        self.detail.refresh();
    }

    pub fn ticker(&self, symbol: Symbol) -> Result<TickerState> {
        Ok(self.poller(symbol)?.state())
    }

    pub fn subscribe_ticker(&self, symbol: Symbol) -> Result<watch::Receiver<TickerState>> {
        Ok(self.poller(symbol)?.subscribe())
    }

    /// Ticker states in tracked order.
    pub fn tickers(&self) -> Vec<TickerState> {
        self.tickers.iter().map(TickerPoller::state).collect()
    }

    pub fn detail(&self) -> DetailState {
        self.detail.state()
    }

    pub fn subscribe_detail(&self) -> watch::Receiver<DetailState> {
        self.detail.subscribe()
    }

    pub fn page_error(&self) -> Option<ErrorInfo> {
        self.banner.current()
    }

    pub fn subscribe_page_error(&self) -> watch::Receiver<Option<ErrorInfo>> {
        self.banner.subscribe()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            using_default_credential: self.credential().is_default(),
            selected: self.selected(),
            page_error: self.page_error(),
            tickers: self.tickers(),
            detail: self.detail(),
        }
    }

    fn poller(&self, symbol: Symbol) -> Result<&TickerPoller> {
        self.tickers
            .iter()
            .find(|poller| poller.symbol() == symbol)
            .ok_or(Error::UntrackedSymbol(symbol))
    }
}
