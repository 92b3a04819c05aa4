//! Page-level error display.

use std::sync::Arc;

use tickerboard_market_data::ErrorInfo;
use tokio::sync::watch;

/// Holds the error shown above the board.
///
/// Only the detail view reports here; ticker errors stay on their cards. The
/// last report wins.
#[derive(Clone)]
pub struct ErrorBanner {
    tx: Arc<watch::Sender<Option<ErrorInfo>>>,
}

impl ErrorBanner {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn report(&self, error: ErrorInfo) {
        self.tx.send_replace(Some(error));
    }

    pub fn clear(&self) {
        self.tx.send_if_modified(|current| current.take().is_some());
    }

    pub fn current(&self) -> Option<ErrorInfo> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ErrorInfo>> {
        self.tx.subscribe()
    }
}

impl Default for ErrorBanner {
    fn default() -> Self {
        Self::new()
    }
}
