use std::collections::HashMap;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, InvalidHeaderValue};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use super::types::{ChainResponse, Quote, QuotesResponse, RawBar, SeriesResponse};
use crate::config::ApiConfig;
use crate::model::RawOption;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("API key is not a valid header value")]
    InvalidKey(#[from] InvalidHeaderValue),

    #[error("building HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to /{endpoint} failed: {source}")]
    Http {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// Thin market-data client: one GET per call, no retries.
#[derive(Debug, Clone)]
pub struct TradierClient {
    http: reqwest::Client,
    base_url: String,
}

impl TradierClient {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("chain-tape/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, ?query, "GET");
        self.http
            .get(&url)
            .query(query)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| FetchError::Http { endpoint, source })?
            .json::<T>()
            .await
            .map_err(|source| FetchError::Http { endpoint, source })
    }

    /// Latest quotes keyed by symbol.
    pub async fn quotes(&self, symbols: &[&str]) -> Result<HashMap<String, Quote>, FetchError> {
        let resp: QuotesResponse = self
            .get("quotes", &[("symbols", symbols.join(","))])
            .await?;
        let (quotes, unmatched) = resp.into_parts();
        if let Some(unmatched) = unmatched {
            warn!(%unmatched, "quote request had unmatched symbols");
        }
        Ok(quotes.into_iter().map(|q| (q.symbol.clone(), q)).collect())
    }

    /// Option chain for one expiration, greeks included. Empty when the API
    /// has no chain for that date.
    pub async fn option_chain(
        &self,
        symbol: &str,
        expiration: NaiveDate,
    ) -> Result<Vec<RawOption>, FetchError> {
        let resp: ChainResponse = self
            .get(
                "options/chains",
                &[
                    ("symbol", symbol.to_string()),
                    ("expiration", expiration.format("%Y-%m-%d").to_string()),
                    ("greeks", "true".to_string()),
                ],
            )
            .await?;
        Ok(resp.into_options())
    }

    /// One-minute time-and-sales bars between two New York wall-clock times.
    pub async fn timesales(
        &self,
        symbol: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<RawBar>, FetchError> {
        let resp: SeriesResponse = self
            .get(
                "timesales",
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", "1min".to_string()),
                    ("start", start.format("%Y-%m-%d %H:%M").to_string()),
                    ("end", end.format("%Y-%m-%d %H:%M").to_string()),
                    ("session_filter", "all".to_string()),
                ],
            )
            .await?;
        Ok(resp.into_bars())
    }
}
