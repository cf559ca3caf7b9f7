use crate::core::error::ProviderError;
use crate::core::quote::QuoteProvider;
use crate::providers::util::{USER_AGENT, send_json};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Crypto spot-price adapter. Symbols are CoinGecko coin ids
/// ("bitcoin", "ethereum"), always lowercase on the wire.
pub struct CoinGeckoProvider {
    base_url: String,
    timeout: Duration,
}

impl CoinGeckoProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        CoinGeckoProvider {
            base_url: base_url.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl QuoteProvider for CoinGeckoProvider {
    fn name(&self) -> &'static str {
        "coingecko"
    }

    #[instrument(name = "CoinGeckoFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<f64, ProviderError> {
        let id = symbol.to_lowercase();
        let url = format!("{}/api/v3/simple/price", self.base_url);
        debug!("Requesting crypto price from {}", url);

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .build()?;
        let request = client
            .get(&url)
            .query(&[("ids", id.as_str()), ("vs_currencies", "usd")]);
        let data = send_json(request).await?;

        let price = data
            .get(&id)
            .and_then(|entry| entry.get("usd"))
            .and_then(Value::as_f64)
            .ok_or(ProviderError::NoQuote)?;

        if !price.is_finite() || price <= 0.0 {
            return Err(ProviderError::NoQuote);
        }
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_simple_price(template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v3/simple/price"))
            .respond_with(template)
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_crypto_fetch() {
        let server =
            mock_simple_price(ResponseTemplate::new(200).set_body_string(
                r#"{"bitcoin": {"usd": 43250.5}}"#,
            ))
            .await;

        let provider = CoinGeckoProvider::new(&server.uri(), Duration::from_secs(5));
        let price = provider.fetch_quote("bitcoin").await.unwrap();
        assert_eq!(price, 43250.5);
    }

    #[tokio::test]
    async fn test_symbol_is_lowercased_for_lookup() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v3/simple/price"))
            .and(query_param("ids", "ethereum"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"ethereum": {"usd": 2300.0}}"#),
            )
            .mount(&mock_server)
            .await;

        let provider = CoinGeckoProvider::new(&mock_server.uri(), Duration::from_secs(5));
        let price = provider.fetch_quote("Ethereum").await.unwrap();
        assert_eq!(price, 2300.0);
    }

    #[tokio::test]
    async fn test_unknown_coin_is_no_quote() {
        let server = mock_simple_price(ResponseTemplate::new(200).set_body_string("{}")).await;

        let provider = CoinGeckoProvider::new(&server.uri(), Duration::from_secs(5));
        let result = provider.fetch_quote("nocoin").await;
        assert!(matches!(result, Err(ProviderError::NoQuote)));
    }

    #[tokio::test]
    async fn test_rate_limit_passes_through() {
        let server = mock_simple_price(ResponseTemplate::new(429)).await;

        let provider = CoinGeckoProvider::new(&server.uri(), Duration::from_secs(5));
        let result = provider.fetch_quote("bitcoin").await;
        assert!(matches!(result, Err(ProviderError::RateLimited)));
    }
}
