use serde::{Serialize, Serializer};

/// Column names in output order. Downstream consumers read these files by
/// header, so the order and spelling are fixed.
#[rustfmt::skip]
pub const HEADERS: [&str; 54] = [
    "Time", "Symbol", "Price", "VIX", "VIX1D",
    "Option", "Type", "Strike Price",
    "Last Price", "Bid", "Ask", "Mid", "Width",
    "Expiration", "DTE", "Straddle Value", "ATM",
    "20-Wide IB Value", "40-Wide IB Value",
    "10-Wide Call Spread", "10-Wide Put Spread",
    "Delta", "Gamma", "Theta", "Vega", "Rho", "Phi",
    "Description", "Exchange",
    "Change", "Volume", "Open", "High", "Low", "Close",
    "Change Percentage", "Average Volume", "Last Volume",
    "Trade Date", "Prev Close", "Week 52 High", "Week 52 Low",
    "Bid Size", "Bid Exchange", "Bid Date",
    "Ask Size", "Ask Exchange", "Ask Date",
    "Open Interest", "Contract Size", "Expiration Type",
    "Root Symbol", "Intrinsic Value", "Extrinsic Value",
];

/// One flattened output record per option contract per snapshot.
///
/// Derived metrics are `None` when a required leg is missing. The flat-file
/// format has no absent marker, so they serialize as `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRow {
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "VIX")]
    pub vix: f64,
    #[serde(rename = "VIX1D")]
    pub vix1d: f64,
    #[serde(rename = "Option")]
    pub option: String,
    #[serde(rename = "Type")]
    pub option_type: String,
    #[serde(rename = "Strike Price")]
    pub strike: f64,
    #[serde(rename = "Last Price")]
    pub last: f64,
    #[serde(rename = "Bid")]
    pub bid: f64,
    #[serde(rename = "Ask")]
    pub ask: f64,
    #[serde(rename = "Mid")]
    pub mid: f64,
    #[serde(rename = "Width")]
    pub width: f64,
    #[serde(rename = "Expiration")]
    pub expiration: String,
    #[serde(rename = "DTE")]
    pub dte: i64,
    #[serde(rename = "Straddle Value", serialize_with = "zero_filled")]
    pub straddle: Option<f64>,
    #[serde(rename = "ATM")]
    pub atm: u8,
    #[serde(rename = "20-Wide IB Value", serialize_with = "zero_filled")]
    pub ib_20: Option<f64>,
    #[serde(rename = "40-Wide IB Value", serialize_with = "zero_filled")]
    pub ib_40: Option<f64>,
    #[serde(rename = "10-Wide Call Spread", serialize_with = "zero_filled")]
    pub call_spread_10: Option<f64>,
    #[serde(rename = "10-Wide Put Spread", serialize_with = "zero_filled")]
    pub put_spread_10: Option<f64>,
    #[serde(rename = "Delta")]
    pub delta: f64,
    #[serde(rename = "Gamma")]
    pub gamma: f64,
    #[serde(rename = "Theta")]
    pub theta: f64,
    #[serde(rename = "Vega")]
    pub vega: f64,
    #[serde(rename = "Rho")]
    pub rho: f64,
    #[serde(rename = "Phi")]
    pub phi: f64,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Exchange")]
    pub exchange: String,
    #[serde(rename = "Change")]
    pub change: f64,
    #[serde(rename = "Volume")]
    pub volume: i64,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Change Percentage")]
    pub change_percentage: f64,
    #[serde(rename = "Average Volume")]
    pub average_volume: i64,
    #[serde(rename = "Last Volume")]
    pub last_volume: i64,
    #[serde(rename = "Trade Date")]
    pub trade_date: String,
    #[serde(rename = "Prev Close")]
    pub prev_close: f64,
    #[serde(rename = "Week 52 High")]
    pub week_52_high: f64,
    #[serde(rename = "Week 52 Low")]
    pub week_52_low: f64,
    #[serde(rename = "Bid Size")]
    pub bid_size: i64,
    #[serde(rename = "Bid Exchange")]
    pub bid_exchange: String,
    #[serde(rename = "Bid Date")]
    pub bid_date: String,
    #[serde(rename = "Ask Size")]
    pub ask_size: i64,
    #[serde(rename = "Ask Exchange")]
    pub ask_exchange: String,
    #[serde(rename = "Ask Date")]
    pub ask_date: String,
    #[serde(rename = "Open Interest")]
    pub open_interest: i64,
    #[serde(rename = "Contract Size")]
    pub contract_size: i64,
    #[serde(rename = "Expiration Type")]
    pub expiration_type: String,
    #[serde(rename = "Root Symbol")]
    pub root_symbol: String,
    #[serde(rename = "Intrinsic Value")]
    pub intrinsic: f64,
    #[serde(rename = "Extrinsic Value")]
    pub extrinsic: f64,
}

fn zero_filled<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.unwrap_or(0.0))
}
