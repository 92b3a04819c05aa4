//! Plain-data views published by the pollers and the detail fetcher.

use serde::Serialize;
use tickerboard_market_data::{ErrorInfo, Quote, Series, Symbol};

/// Lifecycle of a ticker card or the detail view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// What one ticker card shows.
///
/// `quote` and `series` are replaced together on success and left untouched on
/// failure, so an `Error` phase may still carry the last good data.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TickerState {
    pub symbol: Symbol,
    pub quote: Option<Quote>,
    pub series: Series,
    pub phase: Phase,
    pub error: Option<ErrorInfo>,
}

impl TickerState {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            quote: None,
            series: Series::default(),
            phase: Phase::Idle,
            error: None,
        }
    }

    /// True when a failure is shown on top of previously loaded data.
    pub fn is_stale(&self) -> bool {
        self.phase == Phase::Error && self.quote.is_some()
    }
}

/// What the detail view shows.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DetailState {
    pub symbol: Option<Symbol>,
    pub series: Series,
    pub phase: Phase,
    pub error: Option<ErrorInfo>,
}

impl DetailState {
    /// No selection: idle, nothing to show.
    pub fn inert() -> Self {
        Self::default()
    }

    pub fn loading(symbol: Symbol) -> Self {
        Self {
            symbol: Some(symbol),
            series: Series::default(),
            phase: Phase::Loading,
            error: None,
        }
    }
}

/// Serializable view of the whole board.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub using_default_credential: bool,
    pub selected: Option<Symbol>,
    pub page_error: Option<ErrorInfo>,
    pub tickers: Vec<TickerState>,
    pub detail: DetailState,
}
