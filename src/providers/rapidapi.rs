//! RapidAPI-hosted quote and auto-complete adapters
//!
//! Secondary stock quote source plus the symbol search endpoint. Both
//! require the `x-rapidapi-host`/`x-rapidapi-key` header pair; the key is
//! supplied via configuration and absence of it simply makes these
//! providers fail fast into the fallback paths.

use crate::core::error::ProviderError;
use crate::core::quote::{QuoteProvider, SearchHit, SymbolSearchProvider};
use crate::providers::parse::{self, PriceExtractor};
use crate::providers::util::send_json;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

const MAX_SEARCH_HITS: usize = 10;

#[derive(Debug, Clone)]
pub struct RapidApiCredentials {
    pub host: String,
    pub api_key: String,
}

pub struct RapidApiQuoteProvider {
    base_url: String,
    credentials: RapidApiCredentials,
    timeout: Duration,
}

impl RapidApiQuoteProvider {
    pub fn new(base_url: &str, credentials: RapidApiCredentials, timeout: Duration) -> Self {
        RapidApiQuoteProvider {
            base_url: base_url.to_string(),
            credentials,
            timeout,
        }
    }
}

// The timeseries endpoint has answered with every one of these shapes at
// one time or another.
const TIMESERIES_EXTRACTORS: &[PriceExtractor] = &[
    parse::from_flat_price,
    parse::from_timeseries_closes,
    parse::from_quote_summary,
    parse::from_chart_meta,
];

#[async_trait]
impl QuoteProvider for RapidApiQuoteProvider {
    fn name(&self) -> &'static str {
        "rapidapi-timeseries"
    }

    #[instrument(name = "RapidApiQuoteFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<f64, ProviderError> {
        let url = format!("{}/stock/v2/get-timeseries", self.base_url);
        debug!("Requesting quote from {}", url);

        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        let request = client
            .get(&url)
            .query(&[("symbol", symbol), ("region", "US")])
            .header("x-rapidapi-host", &self.credentials.host)
            .header("x-rapidapi-key", &self.credentials.api_key);
        let data = send_json(request).await?;

        parse::first_price(&data, TIMESERIES_EXTRACTORS).ok_or(ProviderError::NoQuote)
    }
}

pub struct RapidApiSearchProvider {
    base_url: String,
    credentials: RapidApiCredentials,
    timeout: Duration,
}

impl RapidApiSearchProvider {
    pub fn new(base_url: &str, credentials: RapidApiCredentials, timeout: Duration) -> Self {
        RapidApiSearchProvider {
            base_url: base_url.to_string(),
            credentials,
            timeout,
        }
    }
}

fn equity_hits(data: &Value) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    // Primary shape: "quotes" array with quoteType tagging
    if let Some(quotes) = data.get("quotes").and_then(Value::as_array) {
        for quote in quotes {
            let symbol = quote.get("symbol").and_then(Value::as_str).unwrap_or("");
            let quote_type = quote
                .get("quoteType")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_lowercase();
            if symbol.is_empty() || !matches!(quote_type.as_str(), "equity" | "stock") {
                continue;
            }
            let name = quote
                .get("longname")
                .and_then(Value::as_str)
                .or_else(|| quote.get("shortname").and_then(Value::as_str))
                .unwrap_or(symbol);
            hits.push(SearchHit {
                symbol: symbol.to_string(),
                name: name.to_string(),
            });
        }
    }

    // Alternate shape: untyped "data" array
    if hits.is_empty()
        && let Some(items) = data.get("data").and_then(Value::as_array)
    {
        for item in items {
            let symbol = item.get("symbol").and_then(Value::as_str).unwrap_or("");
            if symbol.is_empty() {
                continue;
            }
            let name = item
                .get("name")
                .and_then(Value::as_str)
                .or_else(|| item.get("shortName").and_then(Value::as_str))
                .unwrap_or(symbol);
            hits.push(SearchHit {
                symbol: symbol.to_string(),
                name: name.to_string(),
            });
        }
    }

    hits.truncate(MAX_SEARCH_HITS);
    hits
}

#[async_trait]
impl SymbolSearchProvider for RapidApiSearchProvider {
    #[instrument(name = "RapidApiSearch", skip(self), fields(query = %query))]
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ProviderError> {
        let url = format!("{}/auto-complete", self.base_url);
        debug!("Requesting symbol search from {}", url);

        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        let request = client
            .get(&url)
            .query(&[("q", query), ("region", "US")])
            .header("x-rapidapi-host", &self.credentials.host)
            .header("x-rapidapi-key", &self.credentials.api_key);
        let data = send_json(request).await?;

        Ok(equity_hits(&data))
    }
}
