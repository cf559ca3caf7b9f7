//! Synthetic price generation
//!
//! Last line of defense when every live provider is down or rate-limited.
//! Prices are seeded from the reference table, the asset's own last known
//! price, or a fixed default, with a small uniform jitter so consecutive
//! passes still produce movement. Writes through to the store like a live
//! resolution; the store keeps no record of the difference.

use crate::core::asset::Asset;
use crate::core::reference::ReferenceTable;
use crate::store::PriceStore;
use rand::Rng;
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_BASE: f64 = 100.0;
const DEFAULT_RANGE: f64 = 10.0;
/// Jitter is ±2% of the seed range.
const JITTER_FACTOR: f64 = 0.02;
/// Seed range for assets known only by their last price: 5% of it.
const LAST_PRICE_RANGE_FACTOR: f64 = 0.05;
const MIN_PRICE: f64 = 0.01;

pub struct SyntheticQuote {
    reference: ReferenceTable,
    store: Arc<PriceStore>,
}

impl SyntheticQuote {
    pub fn new(reference: ReferenceTable, store: Arc<PriceStore>) -> Self {
        SyntheticQuote { reference, store }
    }

    /// Produces a plausible positive price for the asset and records it.
    /// Never fails: a store write error leaves the asset stale but still
    /// returns the generated value.
    pub fn generate(&self, asset: &Asset) -> f64 {
        let (base, range) = self.seed(asset);

        let jitter_bound = range * JITTER_FACTOR;
        let variation = rand::thread_rng().gen_range(-jitter_bound..=jitter_bound);
        let price = (base + variation).max(MIN_PRICE);

        if let Err(e) = self.store.record_price(asset, price) {
            warn!(symbol = %asset.symbol, error = %e, "Failed to persist synthetic price");
        }
        info!(symbol = %asset.symbol, price, "Generated synthetic price");
        price
    }

    fn seed(&self, asset: &Asset) -> (f64, f64) {
        if let Some(entry) = self.reference.get(&asset.symbol) {
            (entry.base, entry.range)
        } else if let Some(price) = asset.current_price {
            (price, price * LAST_PRICE_RANGE_FACTOR)
        } else {
            (DEFAULT_BASE, DEFAULT_RANGE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::AssetKind;
    use crate::core::reference::ReferenceEntry;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> Arc<PriceStore> {
        Arc::new(PriceStore::open(dir.path()).unwrap())
    }

    #[test]
    fn test_reference_seed_stays_within_jitter_band() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        let table = ReferenceTable::new(vec![ReferenceEntry {
            symbol: "XMPL".to_string(),
            name: "Example Corp".to_string(),
            base: 100.0,
            range: 10.0,
        }]);
        let synthetic = SyntheticQuote::new(table, Arc::clone(&store));
        let asset = store
            .get_or_create_asset("XMPL", AssetKind::Stock, "Example Corp")
            .unwrap();

        for _ in 0..100 {
            let price = synthetic.generate(&asset);
            assert!(price > 0.0);
            assert!((99.8..=100.2).contains(&price), "price {price} out of band");
        }
        assert_eq!(store.price_point_count("XMPL").unwrap(), 100);
    }

    #[test]
    fn test_last_price_seed_for_unknown_symbol() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        let synthetic = SyntheticQuote::new(ReferenceTable::new(vec![]), Arc::clone(&store));
        let asset = store
            .get_or_create_asset("BTCS", AssetKind::Stock, "BTCS")
            .unwrap();
        store.record_price(&asset, 1.40).unwrap();
        let asset = store.get_asset("BTCS").unwrap().unwrap();

        let price = synthetic.generate(&asset);
        assert!((1.40 * 0.95..=1.40 * 1.05).contains(&price));
        assert_eq!(store.price_point_count("BTCS").unwrap(), 2);
        assert_eq!(store.latest_price("BTCS").unwrap(), Some(price));
    }

    #[test]
    fn test_default_seed_when_nothing_known() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        let synthetic = SyntheticQuote::new(ReferenceTable::new(vec![]), Arc::clone(&store));
        let asset = store
            .get_or_create_asset("NEWCO", AssetKind::Stock, "NEWCO")
            .unwrap();

        let price = synthetic.generate(&asset);
        assert!((99.8..=100.2).contains(&price));
        assert!(price > 0.0);
    }
}
