//! Tickerboard Core - fetch orchestration and session state.
//!
//! This crate schedules and reconciles every provider call the board makes:
//! one [`TickerPoller`] per tracked symbol, one [`DetailFetcher`] for the
//! selected symbol, and the two shared containers they observe
//! ([`CredentialStore`] and [`SelectionController`]). Presentation layers
//! read state through [`Dashboard`] and its subscription handles.

pub mod banner;
pub mod config;
pub mod credentials;
pub mod dashboard;
pub mod detail;
pub mod errors;
pub mod selection;
pub mod state;
pub mod ticker;

#[cfg(test)]
pub(crate) mod testing;

pub use banner::ErrorBanner;
pub use config::DashboardConfig;
pub use credentials::{CredentialRevision, CredentialStore};
pub use dashboard::Dashboard;
pub use detail::DetailFetcher;
pub use errors::{Error, Result};
pub use selection::{Selection, SelectionController};
pub use state::{DashboardSnapshot, DetailState, Phase, TickerState};
pub use ticker::{PollerOptions, TickerPoller};
