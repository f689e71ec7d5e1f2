//! Option-chain recording and valuation for index options.
//!
//! The [`chain`] module is the pure core: it turns one option-chain snapshot
//! plus an underlying quote into flattened rows carrying straddle, iron
//! butterfly and vertical spread values. Everything behind the `full` feature
//! is I/O around it: the market-data client, the poll loop, flat-file sinks
//! and logging.

pub mod calendar;
pub mod chain;
pub mod config;
pub mod model;

#[cfg(feature = "full")]
pub mod fetch_data;
#[cfg(feature = "full")]
pub mod logging;
#[cfg(feature = "full")]
pub mod run;
#[cfg(feature = "full")]
pub mod trade_log;
