//! Which symbol, if any, the detail view shows.

use std::sync::Arc;

use log::debug;
use serde::Serialize;
use tickerboard_market_data::Symbol;
use tokio::sync::watch;

use crate::banner::ErrorBanner;

/// Current selection plus a counter bumped on every change request.
///
/// The revision lets subscribers tell "selected the same symbol again" apart
/// from "nothing happened".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub symbol: Option<Symbol>,
    pub revision: u64,
}

/// Owner of the selection. All writes go through `select` and `clear`.
#[derive(Clone)]
pub struct SelectionController {
    tx: Arc<watch::Sender<Selection>>,
    banner: ErrorBanner,
}

impl SelectionController {
    pub fn new(banner: ErrorBanner) -> Self {
        let (tx, _) = watch::channel(Selection::default());
        Self {
            tx: Arc::new(tx),
            banner,
        }
    }

    /// Select a symbol and clear the page-level error.
    pub fn select(&self, symbol: Symbol) {
        debug!("Selecting {}", symbol);
        self.banner.clear();
        self.publish(Some(symbol));
    }

    pub fn clear(&self) {
        debug!("Clearing selection");
        self.publish(None);
    }

    pub fn current(&self) -> Option<Symbol> {
        self.tx.borrow().symbol
    }

    pub fn subscribe(&self) -> watch::Receiver<Selection> {
        self.tx.subscribe()
    }

    fn publish(&self, symbol: Option<Symbol>) {
        self.tx.send_modify(|selection| {
            selection.symbol = symbol;
            selection.revision += 1;
        });
    }
}
