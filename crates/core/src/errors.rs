//! Core error types for the tickerboard.
//!
//! Provider failures never surface here: they are classified by the market
//! data crate and stored in view state. These errors cover misuse of the
//! dashboard API only.

use thiserror::Error;
use tickerboard_market_data::Symbol;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Symbol is not tracked: {0}")]
    UntrackedSymbol(Symbol),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),
}
