//! Market data client abstraction and the Alpha Vantage implementation.
//!
//! This module contains:
//! - The `MarketDataClient` trait consumed by the orchestration layer
//! - The Alpha Vantage client over `reqwest`
//!
//! The orchestration layer only sees the trait, so pollers and fetchers can be
//! driven by a scripted client in tests.

mod traits;

pub mod alpha_vantage;

pub use traits::{MarketDataClient, TICKER_SERIES_LIMIT};
