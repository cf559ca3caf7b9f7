//! Persistent asset and price-history store
//!
//! Two partitions in one fjall keyspace: `assets` maps a symbol to its
//! latest-value row, `prices` holds the append-only history. Price keys are
//! `{symbol}\0{millis:013}{seq:06}` so a prefix scan in key order is
//! insertion order; the sequence counter breaks same-millisecond ties.

use crate::core::asset::{Asset, AssetKind, PricePoint};
use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

const PRICE_KEY_SEPARATOR: char = '\0';

pub struct PriceStore {
    keyspace: Keyspace,
    assets: PartitionHandle,
    prices: PartitionHandle,
    seq: AtomicU64,
}

impl PriceStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open keyspace at {}", path.display()))?;
        let assets = keyspace
            .open_partition("assets", PartitionCreateOptions::default())
            .context("Failed to open assets partition")?;
        let prices = keyspace
            .open_partition("prices", PartitionCreateOptions::default())
            .context("Failed to open prices partition")?;

        Ok(PriceStore {
            keyspace,
            assets,
            prices,
            seq: AtomicU64::new(0),
        })
    }

    pub fn get_asset(&self, symbol: &str) -> Result<Option<Asset>> {
        match self.assets.get(symbol.as_bytes())? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    fn put_asset(&self, asset: &Asset) -> Result<()> {
        self.assets
            .insert(asset.symbol.as_bytes(), serde_json::to_vec(asset)?)?;
        Ok(())
    }

    /// Tracking is idempotent by symbol: an already-known asset is returned
    /// as-is, its price fields untouched.
    pub fn get_or_create_asset(&self, symbol: &str, kind: AssetKind, name: &str) -> Result<Asset> {
        let normalized = kind.normalize_symbol(symbol);
        if let Some(existing) = self.get_asset(&normalized)? {
            return Ok(existing);
        }

        let asset = Asset::new(&normalized, kind, name);
        self.put_asset(&asset)?;
        debug!(symbol = %asset.symbol, kind = %asset.kind, "Created asset");
        Ok(asset)
    }

    pub fn list_assets(&self) -> Result<Vec<Asset>> {
        let mut assets = Vec::new();
        for entry in self.assets.iter() {
            let (_key, raw) = entry?;
            assets.push(serde_json::from_slice::<Asset>(&raw)?);
        }
        Ok(assets)
    }

    pub fn assets_of_kind(&self, kind: AssetKind) -> Result<Vec<Asset>> {
        Ok(self
            .list_assets()?
            .into_iter()
            .filter(|a| a.kind == kind)
            .collect())
    }

    /// Removes the asset row and its whole price history.
    pub fn remove_asset(&self, symbol: &str) -> Result<bool> {
        if self.get_asset(symbol)?.is_none() {
            return Ok(false);
        }

        self.assets.remove(symbol.as_bytes())?;
        let prefix = price_key_prefix(symbol);
        let keys: Vec<_> = self
            .prices
            .prefix(prefix.as_bytes())
            .map(|entry| entry.map(|(key, _)| key))
            .collect::<Result<_, _>>()?;
        for key in keys {
            self.prices.remove(key)?;
        }
        Ok(true)
    }

    /// Updates the latest-value slot and appends one history record in a
    /// single committed batch.
    pub fn record_price(&self, asset: &Asset, price: f64) -> Result<()> {
        if !price.is_finite() || price <= 0.0 {
            return Err(anyhow!(
                "Refusing to record invalid price {} for {}",
                price,
                asset.symbol
            ));
        }

        let now = Utc::now();
        let mut row = self.get_asset(&asset.symbol)?.unwrap_or_else(|| asset.clone());
        row.current_price = Some(price);
        row.last_updated = now;

        let point = PricePoint {
            price,
            timestamp: now,
        };
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) % 1_000_000;
        let point_key = format!(
            "{}{}{:013}{:06}",
            row.symbol,
            PRICE_KEY_SEPARATOR,
            now.timestamp_millis(),
            seq
        );

        let mut batch = self.keyspace.batch();
        batch.insert(&self.assets, row.symbol.as_bytes(), serde_json::to_vec(&row)?);
        batch.insert(&self.prices, point_key.as_bytes(), serde_json::to_vec(&point)?);
        batch.commit()?;

        debug!(symbol = %row.symbol, price, "Recorded price");
        Ok(())
    }

    /// Current price if set, else the most recent history record, else None.
    pub fn latest_price(&self, symbol: &str) -> Result<Option<f64>> {
        if let Some(asset) = self.get_asset(symbol)?
            && let Some(price) = asset.current_price
        {
            return Ok(Some(price));
        }
        Ok(self.history(symbol, 1)?.first().map(|p| p.price))
    }

    /// The most recent `limit` history records, newest first.
    pub fn history(&self, symbol: &str, limit: usize) -> Result<Vec<PricePoint>> {
        let prefix = price_key_prefix(symbol);
        let mut points = Vec::new();
        for entry in self.prices.prefix(prefix.as_bytes()).rev().take(limit) {
            let (_key, raw) = entry?;
            points.push(serde_json::from_slice::<PricePoint>(&raw)?);
        }
        Ok(points)
    }

    pub fn price_point_count(&self, symbol: &str) -> Result<usize> {
        let prefix = price_key_prefix(symbol);
        let mut count = 0;
        for entry in self.prices.prefix(prefix.as_bytes()) {
            entry?;
            count += 1;
        }
        Ok(count)
    }
}

fn price_key_prefix(symbol: &str) -> String {
    format!("{symbol}{PRICE_KEY_SEPARATOR}")
}
