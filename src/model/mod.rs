pub mod coerce;
pub mod quote;
pub mod row;
pub mod snapshot;

pub use quote::{Greeks, OptionQuote, OptionType, QuoteError, RawOption};
pub use row::{DerivedRow, HEADERS};
pub use snapshot::{MarketSnapshot, SnapshotContext};
