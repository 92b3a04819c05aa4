//! Market data models
//!
//! This module contains the core data types:
//! - `symbol` - The fixed set of tracked symbols
//! - `credential` - The provider API key with its default value
//! - `quote` - Latest price summary and the combined ticker snapshot
//! - `series` - Intraday close series in ascending order

mod credential;
mod quote;
mod series;
mod symbol;

pub use credential::{Credential, DEFAULT_CREDENTIAL};
pub use quote::{Quote, Snapshot};
pub use series::{Series, SeriesPoint};
pub use symbol::{Symbol, UnknownSymbol};
