use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when parsing a symbol outside the tracked set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown symbol: {0}")]
pub struct UnknownSymbol(pub String);

/// A tracked stock symbol.
///
/// The set is fixed for the session; [`Symbol::ALL`] gives the display order,
/// which is also the order used to stagger initial fetches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Symbol {
    Ibm,
    Aapl,
    Msft,
    Googl,
}

impl Symbol {
    pub const ALL: [Symbol; 4] = [Symbol::Ibm, Symbol::Aapl, Symbol::Msft, Symbol::Googl];

    /// Ticker as sent to the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::Ibm => "IBM",
            Symbol::Aapl => "AAPL",
            Symbol::Msft => "MSFT",
            Symbol::Googl => "GOOGL",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbol {
    type Err = UnknownSymbol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Symbol::ALL
            .into_iter()
            .find(|symbol| symbol.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownSymbol(trimmed.to_string()))
    }
}
