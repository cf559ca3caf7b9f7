//! Multi-provider price resolution
//!
//! Stocks walk an ordered provider chain; the first finite, positive quote
//! wins and is persisted. A 429 anywhere in the chain means the shared
//! quota is gone, so the chain is abandoned for synthetic data instead of
//! burning the remaining attempts. Crypto uses its single dedicated
//! provider and has no synthetic fallback.

use crate::core::asset::{Asset, AssetKind};
use crate::core::quote::QuoteProvider;
use crate::store::PriceStore;
use crate::synthetic::SyntheticQuote;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no quote available for {symbol}")]
    NoQuote { symbol: String },

    #[error("failed to persist price for {symbol}")]
    Store {
        symbol: String,
        #[source]
        source: anyhow::Error,
    },
}

pub struct PriceResolver {
    stock_chain: Vec<Arc<dyn QuoteProvider>>,
    crypto_provider: Arc<dyn QuoteProvider>,
    synthetic: SyntheticQuote,
    store: Arc<PriceStore>,
}

impl PriceResolver {
    pub fn new(
        stock_chain: Vec<Arc<dyn QuoteProvider>>,
        crypto_provider: Arc<dyn QuoteProvider>,
        synthetic: SyntheticQuote,
        store: Arc<PriceStore>,
    ) -> Self {
        PriceResolver {
            stock_chain,
            crypto_provider,
            synthetic,
            store,
        }
    }

    /// Resolves and persists the asset's current price. Callers must not
    /// write the result to the store again.
    pub async fn resolve_price(&self, asset: &Asset) -> Result<f64, ResolveError> {
        match asset.kind {
            AssetKind::Stock => self.resolve_stock(asset).await,
            AssetKind::Crypto => self.resolve_crypto(asset).await,
        }
    }

    async fn resolve_stock(&self, asset: &Asset) -> Result<f64, ResolveError> {
        for provider in &self.stock_chain {
            match provider.fetch_quote(&asset.symbol).await {
                Ok(price) => {
                    self.record(asset, price)?;
                    info!(
                        symbol = %asset.symbol,
                        provider = provider.name(),
                        price,
                        "Updated price"
                    );
                    return Ok(price);
                }
                Err(e) if e.is_rate_limited() => {
                    warn!(
                        symbol = %asset.symbol,
                        provider = provider.name(),
                        "Quota exhausted, falling back to synthetic price"
                    );
                    return Ok(self.synthetic.generate(asset));
                }
                Err(e) => {
                    debug!(
                        symbol = %asset.symbol,
                        provider = provider.name(),
                        error = %e,
                        "Provider attempt failed, trying next"
                    );
                }
            }
        }

        warn!(symbol = %asset.symbol, "All providers failed, falling back to synthetic price");
        Ok(self.synthetic.generate(asset))
    }

    async fn resolve_crypto(&self, asset: &Asset) -> Result<f64, ResolveError> {
        match self.crypto_provider.fetch_quote(&asset.symbol).await {
            Ok(price) => {
                self.record(asset, price)?;
                info!(symbol = %asset.symbol, price, "Updated crypto price");
                Ok(price)
            }
            Err(e) => {
                debug!(symbol = %asset.symbol, error = %e, "Crypto quote unavailable");
                Err(ResolveError::NoQuote {
                    symbol: asset.symbol.clone(),
                })
            }
        }
    }

    fn record(&self, asset: &Asset, price: f64) -> Result<(), ResolveError> {
        self.store
            .record_price(asset, price)
            .map_err(|source| ResolveError::Store {
                symbol: asset.symbol.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ProviderError;
    use crate::core::reference::ReferenceTable;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    enum MockBehavior {
        Price(f64),
        RateLimited,
        Fail,
    }

    struct MockProvider {
        behavior: MockBehavior,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn new(behavior: MockBehavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteProvider for MockProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn fetch_quote(&self, _symbol: &str) -> Result<f64, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                MockBehavior::Price(price) => Ok(price),
                MockBehavior::RateLimited => Err(ProviderError::RateLimited),
                MockBehavior::Fail => Err(ProviderError::Timeout),
            }
        }
    }

    struct Fixture {
        store: Arc<PriceStore>,
        _dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            let store = Arc::new(PriceStore::open(dir.path()).unwrap());
            Fixture { store, _dir: dir }
        }

        fn resolver(
            &self,
            stock_chain: Vec<Arc<dyn QuoteProvider>>,
            crypto: Arc<dyn QuoteProvider>,
        ) -> PriceResolver {
            let synthetic =
                SyntheticQuote::new(ReferenceTable::default(), Arc::clone(&self.store));
            PriceResolver::new(stock_chain, crypto, synthetic, Arc::clone(&self.store))
        }
    }

    #[tokio::test]
    async fn test_first_provider_success_stops_chain() {
        let fixture = Fixture::new();
        let first = MockProvider::new(MockBehavior::Price(150.65));
        let second = MockProvider::new(MockBehavior::Price(151.0));
        let resolver = fixture.resolver(
            vec![first.clone(), second.clone()],
            MockProvider::new(MockBehavior::Fail),
        );
        let asset = fixture
            .store
            .get_or_create_asset("AAPL", AssetKind::Stock, "Apple Inc.")
            .unwrap();

        let price = resolver.resolve_price(&asset).await.unwrap();

        assert_eq!(price, 150.65);
        assert_eq!(first.call_count(), 1);
        assert_eq!(second.call_count(), 0);
        assert_eq!(fixture.store.latest_price("AAPL").unwrap(), Some(150.65));
        assert_eq!(fixture.store.price_point_count("AAPL").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_provider_falls_through_to_next() {
        let fixture = Fixture::new();
        let first = MockProvider::new(MockBehavior::Fail);
        let second = MockProvider::new(MockBehavior::Price(380.0));
        let resolver = fixture.resolver(
            vec![first.clone(), second.clone()],
            MockProvider::new(MockBehavior::Fail),
        );
        let asset = fixture
            .store
            .get_or_create_asset("MSFT", AssetKind::Stock, "Microsoft Corporation")
            .unwrap();

        let price = resolver.resolve_price(&asset).await.unwrap();

        assert_eq!(price, 380.0);
        assert_eq!(first.call_count(), 1);
        assert_eq!(second.call_count(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_short_circuits_to_synthetic() {
        let fixture = Fixture::new();
        let first = MockProvider::new(MockBehavior::RateLimited);
        let second = MockProvider::new(MockBehavior::Price(999.0));
        let resolver = fixture.resolver(
            vec![first.clone(), second.clone()],
            MockProvider::new(MockBehavior::Fail),
        );
        let asset = fixture
            .store
            .get_or_create_asset("AAPL", AssetKind::Stock, "Apple Inc.")
            .unwrap();

        let price = resolver.resolve_price(&asset).await.unwrap();

        // Siblings are skipped entirely; the synthetic price comes from the
        // reference entry for AAPL (base 272, range 15, jitter 2% of range).
        assert_eq!(second.call_count(), 0);
        assert!(price > 0.0);
        assert!((271.7..=272.3).contains(&price), "price {price} out of band");
        assert_eq!(fixture.store.price_point_count("AAPL").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_chain_falls_back_to_synthetic() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(
            vec![
                MockProvider::new(MockBehavior::Fail),
                MockProvider::new(MockBehavior::Fail),
            ],
            MockProvider::new(MockBehavior::Fail),
        );
        let asset = fixture
            .store
            .get_or_create_asset("UNLISTED", AssetKind::Stock, "UNLISTED")
            .unwrap();

        let price = resolver.resolve_price(&asset).await.unwrap();

        assert!(price > 0.0);
        assert_eq!(fixture.store.price_point_count("UNLISTED").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_crypto_success_is_recorded() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(
            vec![],
            MockProvider::new(MockBehavior::Price(43250.5)),
        );
        let asset = fixture
            .store
            .get_or_create_asset("bitcoin", AssetKind::Crypto, "bitcoin")
            .unwrap();

        let price = resolver.resolve_price(&asset).await.unwrap();

        assert_eq!(price, 43250.5);
        assert_eq!(fixture.store.latest_price("bitcoin").unwrap(), Some(43250.5));
    }

    #[tokio::test]
    async fn test_crypto_has_no_synthetic_fallback() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(vec![], MockProvider::new(MockBehavior::Fail));
        let asset = fixture
            .store
            .get_or_create_asset("bitcoin", AssetKind::Crypto, "bitcoin")
            .unwrap();

        let result = resolver.resolve_price(&asset).await;

        assert!(matches!(result, Err(ResolveError::NoQuote { .. })));
        assert_eq!(fixture.store.price_point_count("bitcoin").unwrap(), 0);
    }
}
