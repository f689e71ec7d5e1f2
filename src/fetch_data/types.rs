use serde::Deserialize;
use serde_json::Value;

use crate::model::RawOption;

// ── Envelope helpers ────────────────────────────────────────────────

/// The API collapses one-element arrays into a bare object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(v) => v,
            OneOrMany::One(t) => vec![t],
        }
    }
}

fn flatten<T>(items: Option<OneOrMany<T>>) -> Vec<T> {
    items.map(OneOrMany::into_vec).unwrap_or_default()
}

// ── /quotes ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Quote {
    pub symbol: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub last: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuotesResponse {
    quotes: Option<QuotesBody>,
}

#[derive(Debug, Deserialize)]
struct QuotesBody {
    #[serde(default)]
    quote: Option<OneOrMany<Quote>>,
    #[serde(default)]
    unmatched_symbols: Option<Value>,
}

impl QuotesResponse {
    pub(crate) fn into_parts(self) -> (Vec<Quote>, Option<Value>) {
        match self.quotes {
            Some(body) => (flatten(body.quote), body.unmatched_symbols),
            None => (Vec::new(), None),
        }
    }
}

// ── /options/chains ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct ChainResponse {
    options: Option<ChainBody>,
}

#[derive(Debug, Deserialize)]
struct ChainBody {
    #[serde(default)]
    option: Option<OneOrMany<RawOption>>,
}

impl ChainResponse {
    pub(crate) fn into_options(self) -> Vec<RawOption> {
        flatten(self.options.and_then(|b| b.option))
    }
}

// ── /timesales ──────────────────────────────────────────────────────

/// One time-and-sales bar. `time` is New York wall-clock without offset.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBar {
    pub time: String,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SeriesResponse {
    series: Option<SeriesBody>,
}

#[derive(Debug, Deserialize)]
struct SeriesBody {
    #[serde(default)]
    data: Option<OneOrMany<RawBar>>,
}

impl SeriesResponse {
    pub(crate) fn into_bars(self) -> Vec<RawBar> {
        flatten(self.series.and_then(|s| s.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quotes_single_object() {
        let resp: QuotesResponse = serde_json::from_value(json!({
            "quotes": {"quote": {"symbol": "SPX", "last": 5001.25}}
        }))
        .unwrap();
        let (quotes, unmatched) = resp.into_parts();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].last, Some(5001.25));
        assert!(unmatched.is_none());
    }

    #[test]
    fn test_quotes_array_with_null_last() {
        let resp: QuotesResponse = serde_json::from_value(json!({
            "quotes": {
                "quote": [
                    {"symbol": "SPX", "last": 5001.25},
                    {"symbol": "VIX1D", "last": null}
                ],
                "unmatched_symbols": {"symbol": "FOO"}
            }
        }))
        .unwrap();
        let (quotes, unmatched) = resp.into_parts();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[1].last, None);
        assert!(unmatched.is_some());
    }

    #[test]
    fn test_chain_null_and_single() {
        let empty: ChainResponse = serde_json::from_value(json!({"options": null})).unwrap();
        assert!(empty.into_options().is_empty());

        let one: ChainResponse = serde_json::from_value(json!({
            "options": {"option": {"symbol": "SPXW1", "strike": 5000, "option_type": "call"}}
        }))
        .unwrap();
        assert_eq!(one.into_options().len(), 1);

        let many: ChainResponse = serde_json::from_value(json!({
            "options": {"option": [
                {"symbol": "SPXW1", "strike": 5000, "option_type": "call"},
                {"symbol": "SPXW2", "strike": 5000, "option_type": "put"}
            ]}
        }))
        .unwrap();
        assert_eq!(many.into_options().len(), 2);
    }

    #[test]
    fn test_series_null() {
        let resp: SeriesResponse = serde_json::from_value(json!({"series": null})).unwrap();
        assert!(resp.into_bars().is_empty());
    }
}
