//! Tickerboard Market Data Crate
//!
//! This crate fetches quotes and intraday series for the tracked symbols and
//! turns every provider outcome into either a typed record or a classified
//! error.
//!
//! # Overview
//!
//! - A fixed set of tracked [`Symbol`]s
//! - A session [`Credential`] with a published default value
//! - The [`MarketDataClient`] seam and its Alpha Vantage implementation
//! - Deterministic error classification ([`ErrorKind`], [`ErrorInfo`])
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! | MarketDataClient | --> |  HTTP (reqwest)  |
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! | Response parsing | --> Quote / Series
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |    Classifier    | --> MarketDataError -> ErrorInfo
//! +------------------+
//! ```

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::{ErrorInfo, ErrorKind, MarketDataError};
pub use models::{
    Credential, Quote, Series, SeriesPoint, Snapshot, Symbol, UnknownSymbol,
    DEFAULT_CREDENTIAL,
};
pub use provider::alpha_vantage::{AlphaVantageClient, AlphaVantageConfig};
pub use provider::{MarketDataClient, TICKER_SERIES_LIMIT};
