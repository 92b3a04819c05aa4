use serde::{Deserialize, Serialize};

/// Classification of a failed fetch.
///
/// # Behavior Summary
///
/// | Kind | Source |
/// |------|--------|
/// | `RateLimited` | Provider message with usage-limit language, or HTTP 429 |
/// | `NoData` | Response without the expected quote or series fields |
/// | `ProviderError` | Any other provider message, or a non-2xx status |
/// | `ConnectivityError` | Transport failure or unreadable body |
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The provider's per-window request cap was hit.
    RateLimited,

    /// The symbol answered but without quote or series data.
    NoData,

    /// The provider rejected the request.
    ProviderError,

    /// The provider could not be reached or its answer could not be read.
    ConnectivityError,
}

/// Error snapshot kept in ticker, detail and page state.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.kind == ErrorKind::RateLimited
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
