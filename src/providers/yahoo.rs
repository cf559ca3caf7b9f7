use crate::core::error::ProviderError;
use crate::core::quote::QuoteProvider;
use crate::providers::parse::{self, PriceExtractor};
use crate::providers::util::{USER_AGENT, send_json};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Chart endpoint adapter. Instantiated twice in the stock chain, once per
/// query host, so a host-level outage only costs one chain step.
pub struct YahooChartProvider {
    base_url: String,
    timeout: Duration,
}

impl YahooChartProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        YahooChartProvider {
            base_url: base_url.to_string(),
            timeout,
        }
    }
}

const CHART_EXTRACTORS: &[PriceExtractor] = &[parse::from_chart_meta];

#[async_trait]
impl QuoteProvider for YahooChartProvider {
    fn name(&self) -> &'static str {
        "yahoo-chart"
    }

    #[instrument(name = "YahooChartFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<f64, ProviderError> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range=1d",
            self.base_url, symbol
        );
        debug!("Requesting quote from {}", url);

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .build()?;
        let data = send_json(client.get(&url).header("Accept", "application/json")).await?;

        parse::first_price(&data, CHART_EXTRACTORS).ok_or(ProviderError::NoQuote)
    }
}

/// quoteSummary endpoint adapter, the alternate route on the primary host.
pub struct YahooSummaryProvider {
    base_url: String,
    timeout: Duration,
}

impl YahooSummaryProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        YahooSummaryProvider {
            base_url: base_url.to_string(),
            timeout,
        }
    }
}

const SUMMARY_EXTRACTORS: &[PriceExtractor] = &[parse::from_quote_summary];

#[async_trait]
impl QuoteProvider for YahooSummaryProvider {
    fn name(&self) -> &'static str {
        "yahoo-summary"
    }

    #[instrument(name = "YahooSummaryFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<f64, ProviderError> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules=price",
            self.base_url, symbol
        );
        debug!("Requesting quote from {}", url);

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .build()?;
        let data = send_json(client.get(&url).header("Accept", "application/json")).await?;

        parse::first_price(&data, SUMMARY_EXTRACTORS).ok_or(ProviderError::NoQuote)
    }
}
