use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::coerce::{self, round2};

// ── Option side ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Case-insensitive parse of `"call"` / `"put"`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" => Some(OptionType::Call),
            "put" => Some(OptionType::Put),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Raw payload record ──────────────────────────────────────────────

/// One option record exactly as the chain endpoint returns it.
///
/// Every field is an untyped JSON value so that one malformed column never
/// rejects the whole chain; coercion happens in [`OptionQuote::from_raw`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawOption {
    pub symbol: Option<Value>,
    pub description: Option<Value>,
    pub exchange: Option<Value>,
    pub strike: Option<Value>,
    pub option_type: Option<Value>,
    pub bid: Option<Value>,
    pub ask: Option<Value>,
    pub last: Option<Value>,
    pub change: Option<Value>,
    pub volume: Option<Value>,
    pub open: Option<Value>,
    pub high: Option<Value>,
    pub low: Option<Value>,
    pub close: Option<Value>,
    pub change_percentage: Option<Value>,
    pub average_volume: Option<Value>,
    pub last_volume: Option<Value>,
    pub trade_date: Option<Value>,
    pub prevclose: Option<Value>,
    pub week_52_high: Option<Value>,
    pub week_52_low: Option<Value>,
    #[serde(alias = "bidsize")]
    pub bid_size: Option<Value>,
    #[serde(alias = "bidexch")]
    pub bid_exchange: Option<Value>,
    pub bid_date: Option<Value>,
    #[serde(alias = "asksize")]
    pub ask_size: Option<Value>,
    #[serde(alias = "askexch")]
    pub ask_exchange: Option<Value>,
    pub ask_date: Option<Value>,
    pub open_interest: Option<Value>,
    pub contract_size: Option<Value>,
    pub expiration_date: Option<Value>,
    pub expiration_type: Option<Value>,
    pub root_symbol: Option<Value>,
    pub greeks: Option<Value>,
}

impl RawOption {
    /// Best-effort identifier for diagnostics.
    pub fn label(&self) -> String {
        match &self.symbol {
            Some(Value::String(s)) => s.clone(),
            _ => "unknown".to_string(),
        }
    }
}

// ── Typed quote ─────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuoteError {
    #[error("option `{symbol}` has no usable strike ({value})")]
    InvalidStrike { symbol: String, value: String },

    #[error("option `{symbol}` has unknown option type ({value})")]
    UnknownType { symbol: String, value: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
    pub phi: f64,
}

impl Greeks {
    fn from_value(value: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = value else {
            return Greeks::default();
        };
        let get = |key: &str| coerce::number_or(map.get(key), 0.0);
        Greeks {
            delta: get("delta"),
            gamma: get("gamma"),
            theta: get("theta"),
            vega: get("vega"),
            rho: get("rho"),
            phi: get("phi"),
        }
    }
}

/// One option contract at a point in time, with every field coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionQuote {
    pub symbol: String,
    pub description: String,
    pub exchange: String,
    pub strike: Decimal,
    pub option_type: OptionType,
    /// Option type exactly as the payload spelled it.
    pub type_label: String,
    pub bid: f64,
    pub ask: f64,
    pub last: f64,
    pub change: f64,
    pub volume: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub change_percentage: f64,
    pub average_volume: i64,
    pub last_volume: i64,
    pub trade_date: String,
    pub prev_close: f64,
    pub week_52_high: f64,
    pub week_52_low: f64,
    pub bid_size: i64,
    pub bid_exchange: String,
    pub bid_date: String,
    pub ask_size: i64,
    pub ask_exchange: String,
    pub ask_date: String,
    pub open_interest: i64,
    pub contract_size: i64,
    pub expiration_date: Option<NaiveDate>,
    pub expiration_type: String,
    pub root_symbol: String,
    pub greeks: Greeks,
}

const DEFAULT_CONTRACT_SIZE: i64 = 100;

impl OptionQuote {
    pub fn from_raw(raw: &RawOption) -> Result<Self, QuoteError> {
        let symbol = coerce::text(raw.symbol.as_ref());

        let strike = coerce::decimal(raw.strike.as_ref()).ok_or_else(|| {
            QuoteError::InvalidStrike {
                symbol: symbol.clone(),
                value: coerce::text(raw.strike.as_ref()),
            }
        })?;

        let (option_type, type_label) = match raw.option_type.as_ref() {
            Some(Value::String(s)) => OptionType::parse(s).map(|t| (t, s.clone())),
            _ => None,
        }
        .ok_or_else(|| QuoteError::UnknownType {
            symbol: symbol.clone(),
            value: coerce::text(raw.option_type.as_ref()),
        })?;

        let num = |v: &Option<Value>| coerce::number_or(v.as_ref(), 0.0);
        let int = |v: &Option<Value>| coerce::integer_or(v.as_ref(), 0);
        let text = |v: &Option<Value>| coerce::text(v.as_ref());

        let expiration_date = match raw.expiration_date.as_ref() {
            Some(Value::String(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
            _ => None,
        };

        Ok(OptionQuote {
            description: text(&raw.description),
            exchange: text(&raw.exchange),
            strike,
            option_type,
            type_label,
            bid: num(&raw.bid),
            ask: num(&raw.ask),
            last: num(&raw.last),
            change: num(&raw.change),
            volume: int(&raw.volume),
            open: num(&raw.open),
            high: num(&raw.high),
            low: num(&raw.low),
            close: num(&raw.close),
            change_percentage: num(&raw.change_percentage),
            average_volume: int(&raw.average_volume),
            last_volume: int(&raw.last_volume),
            trade_date: text(&raw.trade_date),
            prev_close: num(&raw.prevclose),
            week_52_high: num(&raw.week_52_high),
            week_52_low: num(&raw.week_52_low),
            bid_size: int(&raw.bid_size),
            bid_exchange: text(&raw.bid_exchange),
            bid_date: text(&raw.bid_date),
            ask_size: int(&raw.ask_size),
            ask_exchange: text(&raw.ask_exchange),
            ask_date: text(&raw.ask_date),
            open_interest: int(&raw.open_interest),
            contract_size: coerce::integer_or(raw.contract_size.as_ref(), DEFAULT_CONTRACT_SIZE),
            expiration_date,
            expiration_type: text(&raw.expiration_type),
            root_symbol: text(&raw.root_symbol),
            greeks: Greeks::from_value(raw.greeks.as_ref()),
            symbol,
        })
    }

    /// A contract is quoted when at least one side of the market is positive.
    pub fn is_quoted(&self) -> bool {
        self.bid > 0.0 || self.ask > 0.0
    }

    /// Mid price, or `None` when the contract is unquoted.
    pub fn quoted_mid(&self) -> Option<f64> {
        self.is_quoted().then(|| round2((self.bid + self.ask) / 2.0))
    }

    /// Mid price as displayed: 0 when unquoted.
    pub fn mid(&self) -> f64 {
        self.quoted_mid().unwrap_or(0.0)
    }

    /// Bid/ask width as displayed: 0 when unquoted.
    pub fn width(&self) -> f64 {
        if self.is_quoted() {
            round2(self.ask - self.bid)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawOption {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_full_record() {
        let q = OptionQuote::from_raw(&raw(json!({
            "symbol": "SPXW250117C05000000",
            "strike": 5000.0,
            "option_type": "CALL",
            "bid": 12.1,
            "ask": "12.4",
            "volume": 1520,
            "bidsize": 30,
            "bidexch": "C",
            "expiration_date": "2025-01-17",
            "greeks": {"delta": 0.51, "gamma": "N/A", "theta": -3.2}
        })))
        .unwrap();

        assert_eq!(q.option_type, OptionType::Call);
        assert_eq!(q.type_label, "CALL");
        assert_eq!(q.strike.to_string(), "5000");
        assert_eq!(q.mid(), 12.25);
        assert_eq!(q.width(), 0.3);
        assert_eq!(q.volume, 1520);
        assert_eq!(q.bid_size, 30);
        assert_eq!(q.bid_exchange, "C");
        assert_eq!(q.ask_exchange, "N/A");
        assert_eq!(q.contract_size, 100);
        assert_eq!(q.greeks.delta, 0.51);
        assert_eq!(q.greeks.gamma, 0.0);
        assert_eq!(q.greeks.theta, -3.2);
        assert_eq!(q.expiration_date, NaiveDate::from_ymd_opt(2025, 1, 17));
    }

    #[test]
    fn test_unquoted_contract() {
        let q = OptionQuote::from_raw(&raw(json!({
            "strike": 4990, "option_type": "put", "bid": null, "ask": "N/A"
        })))
        .unwrap();
        assert!(!q.is_quoted());
        assert_eq!(q.quoted_mid(), None);
        assert_eq!(q.mid(), 0.0);
        assert_eq!(q.width(), 0.0);
    }

    #[test]
    fn test_one_sided_market_is_quoted() {
        let q = OptionQuote::from_raw(&raw(json!({
            "strike": 4990, "option_type": "put", "bid": 0, "ask": 0.2
        })))
        .unwrap();
        assert_eq!(q.quoted_mid(), Some(0.1));
        assert_eq!(q.width(), 0.2);
    }

    #[test]
    fn test_half_cent_mid_rounds_to_even() {
        let q = OptionQuote::from_raw(&raw(json!({
            "strike": 5000, "option_type": "call", "bid": 1.10, "ask": 1.15
        })))
        .unwrap();
        assert_eq!(q.mid(), 1.12);

        let q = OptionQuote::from_raw(&raw(json!({
            "strike": 5000, "option_type": "put", "bid": 3.35, "ask": 3.40
        })))
        .unwrap();
        assert_eq!(q.mid(), 3.38);
    }

    #[test]
    fn test_rejects_bad_strike_and_type() {
        let err = OptionQuote::from_raw(&raw(json!({
            "symbol": "X", "strike": "abc", "option_type": "call"
        })))
        .unwrap_err();
        assert!(matches!(err, QuoteError::InvalidStrike { .. }));

        let err = OptionQuote::from_raw(&raw(json!({"symbol": "X", "strike": 10})))
            .unwrap_err();
        assert!(matches!(err, QuoteError::UnknownType { .. }));

        let err = OptionQuote::from_raw(&raw(json!({
            "symbol": "X", "strike": 10, "option_type": "straddle"
        })))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "option `X` has unknown option type (straddle)"
        );
    }
}
