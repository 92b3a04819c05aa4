//! Per-symbol quote/series poller.
//!
//! Each poller is a task that owns one [`TickerState`]. It starts its first
//! refresh `index × stagger` after creation so that the tracked symbols do not
//! hit the provider in the same instant, then only refreshes when asked to or
//! when the credential changes.
//!
//! Every refresh cycle gets a generation number. A finished cycle is
//! committed only if no newer cycle was started and no credential change
//! happened since; otherwise its result is dropped.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tickerboard_market_data::{MarketDataClient, MarketDataError, Snapshot, Symbol};
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{sleep_until, Instant};

use crate::config::{DashboardConfig, DEFAULT_STAGGER};
use crate::credentials::{CredentialRevision, CredentialStore};
use crate::state::{Phase, TickerState};

/// Scheduling options for one poller.
#[derive(Clone, Debug)]
pub struct PollerOptions {
    /// Position in the tracked list; multiplies the stagger delay.
    pub index: usize,
    pub stagger: Duration,
    pub series_limit: usize,
    pub stagger_credential_refresh: bool,
}

impl PollerOptions {
    pub fn from_config(config: &DashboardConfig, index: usize) -> Self {
        Self {
            index,
            stagger: config.stagger,
            series_limit: config.series_limit,
            stagger_credential_refresh: config.stagger_credential_refresh,
        }
    }

    /// Delay between creation and the first refresh.
    pub fn start_delay(&self) -> Duration {
        let slots = u32::try_from(self.index).unwrap_or(u32::MAX);
        self.stagger.saturating_mul(slots)
    }
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            index: 0,
            stagger: DEFAULT_STAGGER,
            series_limit: tickerboard_market_data::TICKER_SERIES_LIMIT,
            stagger_credential_refresh: false,
        }
    }
}

enum Command {
    Refresh,
}

/// Handle to a running ticker poller. Dropping it stops the poller and
/// cancels its scheduled and in-flight fetches.
pub struct TickerPoller {
    symbol: Symbol,
    state: watch::Receiver<TickerState>,
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl TickerPoller {
    /// Start a poller. Must be called inside a Tokio runtime.
    pub fn spawn(
        symbol: Symbol,
        client: Arc<dyn MarketDataClient>,
        credentials: &CredentialStore,
        options: PollerOptions,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(TickerState::new(symbol));
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        let worker = TickerWorker {
            symbol,
            deadline: Some(Instant::now() + options.start_delay()),
            client,
            credentials: credentials.subscribe(),
            credentials_open: true,
            options,
            state: state_tx,
            generation: 0,
            in_flight: JoinSet::new(),
        };
        let task = tokio::spawn(worker.run(commands_rx));

        Self {
            symbol,
            state: state_rx,
            commands: commands_tx,
            task,
        }
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn state(&self) -> TickerState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TickerState> {
        self.state.clone()
    }

    /// Start a new refresh cycle now. Cycles already running are not
    /// cancelled, but only the newest one is committed.
    pub fn refresh(&self) {
        if self.commands.send(Command::Refresh).is_err() {
            warn!("Ticker poller for {} is no longer running", self.symbol);
        }
    }
}

impl Drop for TickerPoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

type CycleResult = (u64, Result<Snapshot, MarketDataError>);

struct TickerWorker {
    symbol: Symbol,
    /// Pending scheduled refresh.
    deadline: Option<Instant>,
    client: Arc<dyn MarketDataClient>,
    credentials: watch::Receiver<CredentialRevision>,
    credentials_open: bool,
    options: PollerOptions,
    state: watch::Sender<TickerState>,
    generation: u64,
    in_flight: JoinSet<CycleResult>,
}

impl TickerWorker {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        debug!(
            "Ticker poller for {} scheduled in {:?}",
            self.symbol,
            self.options.start_delay()
        );

        loop {
            // Credential changes are handled before finished cycles.
            tokio::select! {
                biased;

                changed = self.credentials.changed(), if self.credentials_open => {
                    match changed {
                        Ok(()) => self.on_credential_change(),
                        Err(_) => self.credentials_open = false,
                    }
                }
                command = commands.recv() => {
                    match command {
                        Some(Command::Refresh) => self.start_cycle(),
                        None => break,
                    }
                }
                Some(joined) = self.in_flight.join_next() => {
                    self.commit(joined);
                }
                _ = wait_until(self.deadline) => {
                    self.start_cycle();
                }
            }
        }

        debug!("Ticker poller for {} stopped", self.symbol);
    }

    fn start_cycle(&mut self) {
        self.deadline = None;
        self.generation += 1;
        let generation = self.generation;
        let credential = self.credentials.borrow().credential.clone();

        self.state.send_modify(|state| {
            state.phase = Phase::Loading;
            state.error = None;
        });

        debug!("Refreshing {} (cycle {})", self.symbol, generation);
        let client = Arc::clone(&self.client);
        let symbol = self.symbol;
        let limit = self.options.series_limit;
        self.in_flight.spawn(async move {
            let result = client.fetch_snapshot(symbol, &credential, limit).await;
            (generation, result)
        });
    }

    fn on_credential_change(&mut self) {
        if self.options.stagger_credential_refresh {
            self.generation += 1;
            self.deadline = Some(Instant::now() + self.options.start_delay());
            self.state.send_modify(|state| {
                state.phase = Phase::Idle;
                state.error = None;
            });
        } else {
            self.start_cycle();
        }
    }

    fn commit(&mut self, joined: Result<CycleResult, JoinError>) {
        let (generation, result) = match joined {
            Ok(output) => output,
            Err(e) => {
                warn!("Refresh task for {} failed: {}", self.symbol, e);
                return;
            }
        };

        if generation != self.generation || matches!(self.credentials.has_changed(), Ok(true)) {
            debug!(
                "Discarding result of cycle {} for {} (current {})",
                generation, self.symbol, self.generation
            );
            return;
        }

        match result {
            Ok(snapshot) => {
                self.state.send_modify(|state| {
                    state.quote = Some(snapshot.quote);
                    state.series = snapshot.series;
                    state.phase = Phase::Success;
                    state.error = None;
                });
            }
            Err(e) => {
                warn!("Refresh of {} via {} failed: {}", self.symbol, self.client.id(), e);
                self.state.send_modify(|state| {
                    state.phase = Phase::Error;
                    state.error = Some(e.to_info());
                });
            }
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{containers, wait_for, Endpoint, Reply, ScriptedClient};
    use tickerboard_market_data::{ErrorKind, MarketDataError, Quote};
    use tokio::sync::Notify;
    use tokio::time::sleep;

    fn options(index: usize) -> PollerOptions {
        PollerOptions {
            index,
            ..Default::default()
        }
    }

    fn rate_limited() -> MarketDataError {
        MarketDataError::RateLimited {
            message: "Our standard API rate limit is 25 requests per day.".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fetch_waits_for_stagger_slot() {
        let client = Arc::new(ScriptedClient::new());
        let (credentials, _, _) = containers();
        let poller = TickerPoller::spawn(Symbol::Msft, client.clone(), &credentials, options(2));

        sleep(Duration::from_millis(1999)).await;
        assert!(client.calls().is_empty());
        assert_eq!(poller.state().phase, Phase::Idle);

        let mut rx = poller.subscribe();
        wait_for(&mut rx, |state| state.phase == Phase::Success).await;

        let first = &client.calls()[0];
        assert_eq!(first.endpoint, Endpoint::Quote);
        assert!(first.at >= Duration::from_millis(2000));
        assert!(first.at < Duration::from_millis(2010));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_commits_quote_and_recent_series() {
        let client = Arc::new(ScriptedClient::new());
        client.push_quote(Symbol::Ibm, Reply::now(Ok(Quote::new(Symbol::Ibm, 170.5, -0.8))));
        let (credentials, _, _) = containers();
        let poller = TickerPoller::spawn(Symbol::Ibm, client.clone(), &credentials, options(0));

        let mut rx = poller.subscribe();
        let state = wait_for(&mut rx, |state| state.phase == Phase::Success).await;

        assert_eq!(state.quote, Some(Quote::new(Symbol::Ibm, 170.5, -0.8)));
        assert_eq!(state.series.len(), 20);
        let closes: Vec<f64> = state.series.closes().collect();
        assert_eq!(closes.first(), Some(&110.0));
        assert_eq!(closes.last(), Some(&129.0));
        assert!(closes.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(state.error, None);

        let series_call = &client.calls_to(Symbol::Ibm, Endpoint::Series)[0];
        assert_eq!(series_call.limit, Some(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quote_failure_leaves_no_data() {
        let client = Arc::new(ScriptedClient::new());
        client.push_quote(Symbol::Aapl, Reply::now(Err(rate_limited())));
        let (credentials, _, _) = containers();
        let poller = TickerPoller::spawn(Symbol::Aapl, client.clone(), &credentials, options(0));

        let mut rx = poller.subscribe();
        let state = wait_for(&mut rx, |state| state.phase == Phase::Error).await;

        assert_eq!(state.error.map(|e| e.kind), Some(ErrorKind::RateLimited));
        assert!(state.quote.is_none());
        assert!(state.series.is_empty());
        assert!(client.calls_to(Symbol::Aapl, Endpoint::Series).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_series_failure_keeps_previous_data() {
        let client = Arc::new(ScriptedClient::new());
        let (credentials, _, _) = containers();
        let poller = TickerPoller::spawn(Symbol::Googl, client.clone(), &credentials, options(0));
        let mut rx = poller.subscribe();
        let loaded = wait_for(&mut rx, |state| state.phase == Phase::Success).await;

        client.push_quote(Symbol::Googl, Reply::now(Ok(Quote::new(Symbol::Googl, 1.0, 0.0))));
        client.push_series(
            Symbol::Googl,
            Reply::now(Err(MarketDataError::NoData {
                message: "No historical data found.".to_string(),
            })),
        );
        poller.refresh();
        let state = wait_for(&mut rx, |state| state.phase == Phase::Error).await;

        assert_eq!(state.quote, loaded.quote);
        assert_eq!(state.series, loaded.series);
        assert_eq!(state.error.as_ref().map(|e| e.kind), Some(ErrorKind::NoData));
        assert!(state.is_stale());
    }

    #[tokio::test(start_paused = true)]
    async fn test_credential_change_restarts_and_discards_old_results() {
        let client = Arc::new(ScriptedClient::new());
        client.push_quote(
            Symbol::Ibm,
            Reply::after(Duration::from_secs(5), Ok(Quote::new(Symbol::Ibm, 111.0, 0.0))),
        );
        let (credentials, _, _) = containers();
        let poller = TickerPoller::spawn(Symbol::Ibm, client.clone(), &credentials, options(0));
        let mut rx = poller.subscribe();

        sleep(Duration::from_millis(10)).await;
        assert_eq!(client.calls().len(), 1);
        client.push_quote(Symbol::Ibm, Reply::now(Ok(Quote::new(Symbol::Ibm, 222.0, 0.0))));

        credentials.set_credential("NEWKEY");
        let state = wait_for(&mut rx, |state| state.phase == Phase::Success).await;
        assert_eq!(state.quote.map(|q| q.price), Some(222.0));

        sleep(Duration::from_secs(6)).await;
        let state = poller.state();
        assert_eq!(state.quote.map(|q| q.price), Some(222.0));
        assert_eq!(state.phase, Phase::Success);

        let quotes = client.calls_to(Symbol::Ibm, Endpoint::Quote);
        assert_eq!(quotes[0].credential, "demo");
        assert_eq!(quotes[1].credential, "NEWKEY");
        assert!(quotes[1].at < Duration::from_millis(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_credential_change_clears_error_keeps_data() {
        let client = Arc::new(ScriptedClient::new());
        let (credentials, _, _) = containers();
        let poller = TickerPoller::spawn(Symbol::Msft, client.clone(), &credentials, options(0));
        let mut rx = poller.subscribe();
        wait_for(&mut rx, |state| state.phase == Phase::Success).await;

        client.push_quote(Symbol::Msft, Reply::now(Err(rate_limited())));
        poller.refresh();
        wait_for(&mut rx, |state| state.phase == Phase::Error).await;

        client.push_quote(
            Symbol::Msft,
            Reply::after(Duration::from_secs(1), Ok(Quote::new(Symbol::Msft, 5.0, 0.0))),
        );
        credentials.set_credential("OTHER");
        let state = wait_for(&mut rx, |state| state.phase == Phase::Loading).await;
        assert_eq!(state.error, None);
        assert!(state.quote.is_some());
        assert_eq!(state.series.len(), 20);

        let state = wait_for(&mut rx, |state| state.phase == Phase::Success).await;
        assert_eq!(state.quote.map(|q| q.price), Some(5.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_refreshes_newest_wins() {
        let client = Arc::new(ScriptedClient::new());
        let (credentials, _, _) = containers();
        let poller = TickerPoller::spawn(Symbol::Aapl, client.clone(), &credentials, options(0));
        let mut rx = poller.subscribe();
        wait_for(&mut rx, |state| state.phase == Phase::Success).await;

        client.push_quote(
            Symbol::Aapl,
            Reply::after(Duration::from_secs(3), Ok(Quote::new(Symbol::Aapl, 111.0, 0.0))),
        );
        poller.refresh();
        sleep(Duration::from_millis(10)).await;
        client.push_quote(
            Symbol::Aapl,
            Reply::after(Duration::from_secs(1), Ok(Quote::new(Symbol::Aapl, 222.0, 0.0))),
        );
        poller.refresh();

        let state = wait_for(&mut rx, |state| state.phase == Phase::Success).await;
        assert_eq!(state.quote.map(|q| q.price), Some(222.0));

        sleep(Duration::from_secs(4)).await;
        assert_eq!(poller.state().quote.map(|q| q.price), Some(222.0));
        assert_eq!(client.calls_to(Symbol::Aapl, Endpoint::Quote).len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_older_refresh_finishing_first_is_ignored() {
        let client = Arc::new(ScriptedClient::new());
        let (credentials, _, _) = containers();
        let poller = TickerPoller::spawn(Symbol::Aapl, client.clone(), &credentials, options(0));
        let mut rx = poller.subscribe();
        wait_for(&mut rx, |state| state.phase == Phase::Success).await;

        client.push_quote(
            Symbol::Aapl,
            Reply::after(Duration::from_secs(1), Ok(Quote::new(Symbol::Aapl, 111.0, 0.0))),
        );
        poller.refresh();
        sleep(Duration::from_millis(10)).await;
        client.push_quote(
            Symbol::Aapl,
            Reply::after(Duration::from_secs(3), Ok(Quote::new(Symbol::Aapl, 222.0, 0.0))),
        );
        poller.refresh();

        sleep(Duration::from_millis(1500)).await;
        assert_eq!(poller.state().phase, Phase::Loading);

        let state = wait_for(&mut rx, |state| state.phase == Phase::Success).await;
        assert_eq!(state.quote.map(|q| q.price), Some(222.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_scheduled_fetch() {
        let client = Arc::new(ScriptedClient::new());
        let (credentials, _, _) = containers();
        let poller = TickerPoller::spawn(Symbol::Googl, client.clone(), &credentials, options(1));

        sleep(Duration::from_millis(500)).await;
        drop(poller);
        sleep(Duration::from_secs(3)).await;

        assert!(client.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_replaces_scheduled_start() {
        let client = Arc::new(ScriptedClient::new());
        let (credentials, _, _) = containers();
        let poller = TickerPoller::spawn(Symbol::Googl, client.clone(), &credentials, options(3));

        sleep(Duration::from_millis(100)).await;
        poller.refresh();
        sleep(Duration::from_secs(5)).await;

        let quotes = client.calls_to(Symbol::Googl, Endpoint::Quote);
        assert_eq!(quotes.len(), 1);
        assert!(quotes[0].at < Duration::from_millis(200));
        assert_eq!(poller.state().phase, Phase::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_staggered_credential_refresh_waits_for_slot() {
        let client = Arc::new(ScriptedClient::new());
        let (credentials, _, _) = containers();
        let poller = TickerPoller::spawn(
            Symbol::Aapl,
            client.clone(),
            &credentials,
            PollerOptions {
                index: 1,
                stagger_credential_refresh: true,
                ..Default::default()
            },
        );
        let mut rx = poller.subscribe();
        wait_for(&mut rx, |state| state.phase == Phase::Success).await;

        sleep(Duration::from_millis(500)).await;
        credentials.set_credential("LATER");
        sleep(Duration::from_millis(10)).await;
        let state = poller.state();
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.quote.is_some());

        wait_for(&mut rx, |state| state.phase == Phase::Success).await;
        let quotes = client.calls_to(Symbol::Aapl, Endpoint::Quote);
        assert_eq!(quotes.len(), 2);
        assert!(quotes[1].at >= Duration::from_millis(2500));
        assert_eq!(quotes[1].credential, "LATER");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_finishing_as_credential_changes_is_dropped() {
        let gate = Arc::new(Notify::new());
        let client = Arc::new(ScriptedClient::new());
        client.push_quote(
            Symbol::Ibm,
            Reply::gated(gate.clone(), Ok(Quote::new(Symbol::Ibm, 111.0, 0.0))),
        );
        let (credentials, _, _) = containers();
        let poller = TickerPoller::spawn(
            Symbol::Ibm,
            client.clone(),
            &credentials,
            PollerOptions {
                index: 1,
                stagger_credential_refresh: true,
                ..Default::default()
            },
        );

        sleep(Duration::from_millis(1010)).await;
        assert_eq!(client.calls_to(Symbol::Ibm, Endpoint::Quote).len(), 1);

        // The old cycle completes and the credential changes before the
        // poller gets to run again.
        gate.notify_one();
        credentials.set_credential("NEWKEY");
        sleep(Duration::from_millis(10)).await;

        let state = poller.state();
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.quote, None);
        assert!(state.series.is_empty());

        let mut rx = poller.subscribe();
        let state = wait_for(&mut rx, |state| state.phase == Phase::Success).await;
        assert_eq!(state.quote.map(|q| q.price), Some(100.0));
        let quotes = client.calls_to(Symbol::Ibm, Endpoint::Quote);
        assert_eq!(quotes.last().map(|c| c.credential.as_str()), Some("NEWKEY"));
    }

    #[test]
    fn test_start_delay() {
        assert_eq!(options(0).start_delay(), Duration::ZERO);
        assert_eq!(options(3).start_delay(), Duration::from_millis(3000));
    }
}
