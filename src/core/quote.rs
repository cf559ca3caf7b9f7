//! Quote and symbol-search provider abstractions

use crate::core::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single upstream price source. Each implementation knows one wire
/// format and fails independently of its siblings in the chain.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    async fn fetch_quote(&self, symbol: &str) -> Result<f64, ProviderError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub symbol: String,
    pub name: String,
}

/// Symbol auto-complete lookup, used by validation and interactive search.
#[async_trait]
pub trait SymbolSearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ProviderError>;
}
