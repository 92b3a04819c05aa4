//! Error types and classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The error enum returned by every provider operation
//! - [`ErrorKind`]: The four-way classification surfaced to consumers
//! - [`ErrorInfo`]: The plain-data form of an error stored in view state
//! - [`classifier`]: Pure functions mapping provider output to errors

pub mod classifier;
mod kind;

pub use kind::{ErrorInfo, ErrorKind};

use thiserror::Error;

/// Errors that can occur while fetching market data.
///
/// Each variant maps to exactly one [`ErrorKind`] via [`kind`](Self::kind).
/// None of them is fatal; recovery is always user-initiated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketDataError {
    /// The provider reported that the usage limit was reached.
    /// The raw provider message is kept for display.
    #[error("{message}")]
    RateLimited {
        /// The message returned by the provider
        message: String,
    },

    /// The response carried no error field but lacked the expected data.
    #[error("{message}")]
    NoData {
        /// Fixed human-readable description of what was missing
        message: String,
    },

    /// The provider returned an explicit error message.
    #[error("{message}")]
    ProviderError {
        /// The message returned by the provider
        message: String,
    },

    /// The request never produced a readable response.
    #[error("{message}")]
    Connectivity {
        /// Fixed human-readable description
        message: String,
    },
}

impl MarketDataError {
    /// Returns the classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use tickerboard_market_data::errors::{ErrorKind, MarketDataError};
    ///
    /// let error = MarketDataError::RateLimited { message: "rate limit".to_string() };
    /// assert_eq!(error.kind(), ErrorKind::RateLimited);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::NoData { .. } => ErrorKind::NoData,
            Self::ProviderError { .. } => ErrorKind::ProviderError,
            Self::Connectivity { .. } => ErrorKind::ConnectivityError,
        }
    }

    /// The human-readable message carried by this error.
    pub fn message(&self) -> &str {
        match self {
            Self::RateLimited { message }
            | Self::NoData { message }
            | Self::ProviderError { message }
            | Self::Connectivity { message } => message,
        }
    }

    /// Snapshot of this error as stored in view state.
    pub fn to_info(&self) -> ErrorInfo {
        ErrorInfo::new(self.kind(), self.message())
    }
}

impl From<MarketDataError> for ErrorInfo {
    fn from(error: MarketDataError) -> Self {
        error.to_info()
    }
}
