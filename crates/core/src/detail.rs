//! Series fetcher for the selected symbol.
//!
//! The fetcher restarts whenever the selection or the credential changes.
//! Each restart bumps a generation counter; a response is committed only if
//! it belongs to the current generation and the symbol it was fetched for is
//! still the one shown. Failures are written both to the detail state and to
//! the page-level [`ErrorBanner`].

use std::sync::Arc;

use log::{debug, warn};
use tickerboard_market_data::{MarketDataClient, MarketDataError, Series, Symbol};
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};

use crate::banner::ErrorBanner;
use crate::credentials::{CredentialRevision, CredentialStore};
use crate::selection::{Selection, SelectionController};
use crate::state::{DetailState, Phase};

enum Command {
    Refresh,
}

/// Handle to the running detail fetcher. Dropping it cancels any fetch in
/// flight.
pub struct DetailFetcher {
    state: watch::Receiver<DetailState>,
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl DetailFetcher {
    /// Start the fetcher. Must be called inside a Tokio runtime.
    pub fn spawn(
        client: Arc<dyn MarketDataClient>,
        credentials: &CredentialStore,
        selection: &SelectionController,
        banner: ErrorBanner,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(DetailState::inert());
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        let worker = DetailWorker {
            client,
            credentials: credentials.subscribe(),
            credentials_open: true,
            selection: selection.subscribe(),
            selection_open: true,
            banner,
            state: state_tx,
            generation: 0,
            in_flight: JoinSet::new(),
        };
        let task = tokio::spawn(worker.run(commands_rx));

        Self {
            state: state_rx,
            commands: commands_tx,
            task,
        }
    }

    pub fn state(&self) -> DetailState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.clone()
    }

    /// Re-fetch the series for the current selection.
    pub fn refresh(&self) {
        if self.commands.send(Command::Refresh).is_err() {
            warn!("Detail fetcher is no longer running");
        }
    }
}

impl Drop for DetailFetcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

type FetchResult = (u64, Symbol, Result<Series, MarketDataError>);

struct DetailWorker {
    client: Arc<dyn MarketDataClient>,
    credentials: watch::Receiver<CredentialRevision>,
    credentials_open: bool,
    selection: watch::Receiver<Selection>,
    selection_open: bool,
    banner: ErrorBanner,
    state: watch::Sender<DetailState>,
    generation: u64,
    in_flight: JoinSet<FetchResult>,
}

impl DetailWorker {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        self.reload();

        loop {
            // Session changes are handled before finished fetches.
            tokio::select! {
                biased;

                changed = self.credentials.changed(), if self.credentials_open => {
                    match changed {
                        Ok(()) => {
                            self.banner.clear();
                            self.reload();
                        }
                        Err(_) => self.credentials_open = false,
                    }
                }
                changed = self.selection.changed(), if self.selection_open => {
                    match changed {
                        Ok(()) => self.reload(),
                        Err(_) => self.selection_open = false,
                    }
                }
                command = commands.recv() => {
                    match command {
                        Some(Command::Refresh) => self.reload(),
                        None => break,
                    }
                }
                Some(joined) = self.in_flight.join_next() => {
                    self.commit(joined);
                }
            }
        }

        debug!("Detail fetcher stopped");
    }

    /// Reset the view for the current selection and credential.
    fn reload(&mut self) {
        self.generation += 1;
        // Both are read here so a credential change that also cleared the
        // selection is handled in one pass.
        let symbol = self.selection.borrow_and_update().symbol;
        let credential = self.credentials.borrow_and_update().credential.clone();

        let Some(symbol) = symbol else {
            self.state.send_replace(DetailState::inert());
            return;
        };

        self.state.send_replace(DetailState::loading(symbol));
        self.banner.clear();

        debug!("Loading detail series for {} (generation {})", symbol, self.generation);
        let generation = self.generation;
        let client = Arc::clone(&self.client);
        self.in_flight.spawn(async move {
            let result = client.fetch_series(symbol, &credential, None).await;
            (generation, symbol, result)
        });
    }

    /// True when a selection or credential change is waiting to be handled.
    fn session_changed(&self) -> bool {
        matches!(self.selection.has_changed(), Ok(true))
            || matches!(self.credentials.has_changed(), Ok(true))
    }

    fn commit(&mut self, joined: Result<FetchResult, JoinError>) {
        let (generation, symbol, result) = match joined {
            Ok(output) => output,
            Err(e) => {
                warn!("Detail fetch task failed: {}", e);
                return;
            }
        };

        if generation != self.generation
            || self.state.borrow().symbol != Some(symbol)
            || self.session_changed()
        {
            debug!("Discarding stale detail series for {}", symbol);
            return;
        }

        match result {
            Ok(series) => {
                self.state.send_modify(|state| {
                    state.series = series;
                    state.phase = Phase::Success;
                    state.error = None;
                });
            }
            Err(e) => {
                warn!("Detail series for {} via {} failed: {}", symbol, self.client.id(), e);
                let info = e.to_info();
                self.state.send_modify(|state| {
                    state.phase = Phase::Error;
                    state.error = Some(info.clone());
                });
                self.banner.report(info);
            }
        }
    }
}
