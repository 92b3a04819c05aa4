use serde::{Deserialize, Serialize};

use super::series::Series;
use super::symbol::Symbol;

/// Latest price summary for a symbol.
///
/// Price and change percent are always set together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,

    /// Last traded price
    pub price: f64,

    /// Change versus previous close, in percent (1.5 means +1.5%)
    pub change_percent: f64,
}

impl Quote {
    pub fn new(symbol: Symbol, price: f64, change_percent: f64) -> Self {
        Self {
            symbol,
            price,
            change_percent,
        }
    }

    pub fn is_gain(&self) -> bool {
        self.change_percent >= 0.0
    }
}

/// Result of one complete ticker refresh cycle: a quote and its series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub quote: Quote,
    pub series: Series,
}
