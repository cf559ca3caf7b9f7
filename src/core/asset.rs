//! Tracked asset types and their persistence records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Stock,
    Crypto,
}

impl Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                AssetKind::Stock => "stock",
                AssetKind::Crypto => "crypto",
            }
        )
    }
}

impl FromStr for AssetKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stock" => Ok(AssetKind::Stock),
            "crypto" => Ok(AssetKind::Crypto),
            _ => Err(anyhow::anyhow!("Invalid asset kind: {}", s)),
        }
    }
}

impl AssetKind {
    /// Symbol case convention per kind: tickers are upper, crypto ids are
    /// the provider's lowercase identifiers.
    pub fn normalize_symbol(&self, symbol: &str) -> String {
        match self {
            AssetKind::Stock => symbol.trim().to_uppercase(),
            AssetKind::Crypto => symbol.trim().to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub symbol: String,
    pub kind: AssetKind,
    pub name: String,
    pub current_price: Option<f64>,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Asset {
    pub fn new(symbol: &str, kind: AssetKind, name: &str) -> Self {
        let now = Utc::now();
        Asset {
            symbol: kind.normalize_symbol(symbol),
            kind,
            name: name.to_string(),
            current_price: None,
            last_updated: now,
            created_at: now,
        }
    }
}

/// One immutable historical price observation. Appended on every successful
/// resolution, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}
