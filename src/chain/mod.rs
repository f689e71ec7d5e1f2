//! Per-snapshot option-chain valuation: strike ledger, spread metrics and
//! the flattened output rows.

pub mod ledger;
pub mod metrics;
pub mod pipeline;

pub use ledger::{Leg, StrikeEntry, StrikeLedger};
pub use pipeline::{build_rows, derive_row, parse_chain, process_snapshot};
