//! Test doubles shared by the orchestration tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tickerboard_market_data::{
    Credential, MarketDataClient, MarketDataError, Quote, Series, SeriesPoint, Symbol,
};
use tokio::sync::{watch, Notify};
use tokio::time::{sleep, timeout, Instant};

use crate::banner::ErrorBanner;
use crate::credentials::CredentialStore;
use crate::selection::SelectionController;

const WAIT_LIMIT: Duration = Duration::from_secs(120);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Endpoint {
    Quote,
    Series,
}

/// One recorded provider call.
#[derive(Clone, Debug)]
pub(crate) struct Call {
    pub symbol: Symbol,
    pub endpoint: Endpoint,
    /// Time since the client was created.
    pub at: Duration,
    pub credential: String,
    pub limit: Option<usize>,
}

pub(crate) struct Reply<T> {
    delay: Duration,
    gate: Option<Arc<Notify>>,
    result: Result<T, MarketDataError>,
}

impl<T> Reply<T> {
    pub fn now(result: Result<T, MarketDataError>) -> Self {
        Self::after(Duration::ZERO, result)
    }

    pub fn after(delay: Duration, result: Result<T, MarketDataError>) -> Self {
        Self {
            delay,
            gate: None,
            result,
        }
    }

    /// Held until `gate` is notified.
    pub fn gated(gate: Arc<Notify>, result: Result<T, MarketDataError>) -> Self {
        Self {
            delay: Duration::ZERO,
            gate: Some(gate),
            result,
        }
    }

    async fn deliver(self) -> Result<T, MarketDataError> {
        if let Some(gate) = self.gate {
            gate.notified().await;
        }
        sleep(self.delay).await;
        self.result
    }
}

/// Client that answers from per-symbol queues and falls back to fixed data.
///
/// Default quote: price 100, change 1%. Default series: 30 points whose closes
/// start at a per-symbol base (IBM 100, AAPL 200, MSFT 300, GOOGL 400).
pub(crate) struct ScriptedClient {
    start: Instant,
    quotes: Mutex<HashMap<Symbol, VecDeque<Reply<Quote>>>>,
    series: Mutex<HashMap<Symbol, VecDeque<Reply<Series>>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            quotes: Mutex::new(HashMap::new()),
            series: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn push_quote(&self, symbol: Symbol, reply: Reply<Quote>) {
        self.quotes
            .lock()
            .unwrap()
            .entry(symbol)
            .or_default()
            .push_back(reply);
    }

    pub fn push_series(&self, symbol: Symbol, reply: Reply<Series>) {
        self.series
            .lock()
            .unwrap()
            .entry(symbol)
            .or_default()
            .push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, symbol: Symbol, endpoint: Endpoint) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.symbol == symbol && call.endpoint == endpoint)
            .collect()
    }

    fn record(
        &self,
        symbol: Symbol,
        endpoint: Endpoint,
        credential: &Credential,
        limit: Option<usize>,
    ) {
        self.calls.lock().unwrap().push(Call {
            symbol,
            endpoint,
            at: Instant::now() - self.start,
            credential: credential.expose().to_string(),
            limit,
        });
    }
}

#[async_trait]
impl MarketDataClient for ScriptedClient {
    fn id(&self) -> &'static str {
        "SCRIPTED"
    }

    async fn fetch_quote(
        &self,
        symbol: Symbol,
        credential: &Credential,
    ) -> Result<Quote, MarketDataError> {
        self.record(symbol, Endpoint::Quote, credential, None);
        let reply = self
            .quotes
            .lock()
            .unwrap()
            .get_mut(&symbol)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Reply::now(Ok(Quote::new(symbol, 100.0, 1.0))));
        reply.deliver().await
    }

    async fn fetch_series(
        &self,
        symbol: Symbol,
        credential: &Credential,
        limit: Option<usize>,
    ) -> Result<Series, MarketDataError> {
        self.record(symbol, Endpoint::Series, credential, limit);
        let reply = self
            .series
            .lock()
            .unwrap()
            .get_mut(&symbol)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Reply::now(Ok(default_series(symbol))));
        reply
            .deliver()
            .await
            .map(|series| series.keep_recent(limit.unwrap_or(usize::MAX)))
    }
}

/// Base close of [`default_series`] for a symbol.
pub(crate) fn series_base(symbol: Symbol) -> f64 {
    match symbol {
        Symbol::Ibm => 100.0,
        Symbol::Aapl => 200.0,
        Symbol::Msft => 300.0,
        Symbol::Googl => 400.0,
    }
}

pub(crate) fn default_series(symbol: Symbol) -> Series {
    let base = series_base(symbol);
    Series::new(
        (0..30)
            .map(|i| SeriesPoint::new(format!("2024-05-17 {:02}:00:00", i), base + i as f64))
            .collect(),
    )
}

/// Credential store, selection and page error wired together.
pub(crate) fn containers() -> (CredentialStore, SelectionController, ErrorBanner) {
    let banner = ErrorBanner::new();
    let selection = SelectionController::new(banner.clone());
    let credentials = CredentialStore::new(Credential::default(), selection.clone(), banner.clone());
    (credentials, selection, banner)
}

/// Wait until the published value satisfies `predicate`, failing the test on
/// timeout instead of hanging.
pub(crate) async fn wait_for<T: Clone + std::fmt::Debug>(
    rx: &mut watch::Receiver<T>,
    mut predicate: impl FnMut(&T) -> bool,
) -> T {
    let outcome = timeout(WAIT_LIMIT, rx.wait_for(|value| predicate(value)))
        .await
        .map(|waited| waited.map(|value| (*value).clone()));
    match outcome {
        Ok(Ok(value)) => value,
        Ok(Err(_)) => panic!("state channel closed"),
        Err(_) => panic!("timed out; last state: {:?}", *rx.borrow()),
    }
}
