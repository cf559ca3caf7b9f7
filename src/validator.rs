//! Symbol validation and search
//!
//! Validation runs cheapest-first: static reference table, then the local
//! store, then the live auto-complete provider. When the provider is
//! rate-limited or unreachable the validator is deliberately permissive:
//! a user adding a legitimate ticker during an upstream outage should not
//! be blocked.

use crate::core::asset::AssetKind;
use crate::core::quote::{SearchHit, SymbolSearchProvider};
use crate::core::reference::ReferenceTable;
use crate::store::PriceStore;
use std::sync::Arc;
use tracing::{debug, warn};

const MAX_SEARCH_RESULTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub display_name: Option<String>,
}

impl Validation {
    fn known(name: &str) -> Self {
        Validation {
            valid: true,
            display_name: Some(name.to_string()),
        }
    }

    fn invalid() -> Self {
        Validation {
            valid: false,
            display_name: None,
        }
    }
}

pub struct SymbolValidator {
    reference: ReferenceTable,
    store: Arc<PriceStore>,
    search_provider: Option<Arc<dyn SymbolSearchProvider>>,
}

impl SymbolValidator {
    pub fn new(
        reference: ReferenceTable,
        store: Arc<PriceStore>,
        search_provider: Option<Arc<dyn SymbolSearchProvider>>,
    ) -> Self {
        SymbolValidator {
            reference,
            store,
            search_provider,
        }
    }

    /// Confirms a ticker refers to a real equity before it is tracked.
    pub async fn validate(&self, symbol: &str) -> Validation {
        let symbol = symbol.trim().to_uppercase();

        if let Some(entry) = self.reference.get(&symbol) {
            return Validation::known(&entry.name);
        }

        match self.store.get_asset(&symbol) {
            Ok(Some(asset)) if asset.kind == AssetKind::Stock => {
                return Validation::known(&asset.name);
            }
            Ok(_) => {}
            Err(e) => debug!(symbol = %symbol, error = %e, "Store lookup failed during validation"),
        }

        let Some(provider) = &self.search_provider else {
            warn!(symbol = %symbol, "No search provider configured, accepting symbol as-is");
            return Validation::known(&symbol);
        };

        match provider.search(&symbol).await {
            Ok(hits) => {
                match hits.iter().find(|h| h.symbol.to_uppercase() == symbol) {
                    Some(hit) => Validation::known(&hit.name),
                    None => Validation::invalid(),
                }
            }
            Err(e) => {
                warn!(
                    symbol = %symbol,
                    error = %e,
                    "Symbol lookup unavailable, accepting symbol as-is"
                );
                Validation::known(&symbol)
            }
        }
    }

    /// Interactive search: live auto-complete when available, otherwise the
    /// reference table and already-tracked assets.
    pub async fn search(&self, query: &str) -> Vec<SearchHit> {
        if let Some(provider) = &self.search_provider {
            match provider.search(query).await {
                Ok(hits) if !hits.is_empty() => return hits,
                Ok(_) => debug!(query, "Live search returned no hits, using local fallback"),
                Err(e) => warn!(query, error = %e, "Live search failed, using local fallback"),
            }
        }
        self.local_matches(query)
    }

    fn local_matches(&self, query: &str) -> Vec<SearchHit> {
        let query_upper = query.to_uppercase();
        let mut hits: Vec<SearchHit> = self
            .reference
            .matching(query)
            .into_iter()
            .map(|entry| SearchHit {
                symbol: entry.symbol.clone(),
                name: entry.name.clone(),
            })
            .collect();

        if let Ok(assets) = self.store.list_assets() {
            for asset in assets {
                if asset.kind == AssetKind::Stock && asset.symbol.contains(&query_upper) {
                    hits.push(SearchHit {
                        symbol: asset.symbol,
                        name: asset.name,
                    });
                }
            }
        }

        let mut seen = std::collections::HashSet::new();
        hits.retain(|hit| seen.insert(hit.symbol.clone()));
        hits.truncate(MAX_SEARCH_RESULTS);
        hits
    }
}
