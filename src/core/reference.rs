//! Static reference data for well-known symbols
//!
//! Seeds synthetic price generation and gives the validator an
//! authoritative, network-free answer for popular tickers. The built-in
//! table can be replaced wholesale from configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub symbol: String,
    pub name: String,
    /// Typical price level used as the synthetic base.
    pub base: f64,
    /// Typical daily range around the base.
    pub range: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceTable {
    entries: Vec<ReferenceEntry>,
}

impl ReferenceTable {
    pub fn new(entries: Vec<ReferenceEntry>) -> Self {
        ReferenceTable { entries }
    }

    pub fn get(&self, symbol: &str) -> Option<&ReferenceEntry> {
        let symbol = symbol.to_uppercase();
        self.entries.iter().find(|e| e.symbol == symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    /// Case-insensitive substring match over symbol and name, used as the
    /// offline search fallback.
    pub fn matching(&self, query: &str) -> Vec<&ReferenceEntry> {
        let query = query.to_uppercase();
        self.entries
            .iter()
            .filter(|e| e.symbol.contains(&query) || e.name.to_uppercase().contains(&query))
            .collect()
    }
}

impl Default for ReferenceTable {
    fn default() -> Self {
        let entries = [
            ("AAPL", "Apple Inc.", 272.0, 15.0),
            ("MSFT", "Microsoft Corporation", 380.0, 15.0),
            ("GOOGL", "Alphabet Inc.", 140.0, 8.0),
            ("AMZN", "Amazon.com Inc.", 150.0, 10.0),
            ("TSLA", "Tesla, Inc.", 250.0, 20.0),
            ("META", "Meta Platforms Inc.", 350.0, 15.0),
            ("NVDA", "NVIDIA Corporation", 500.0, 30.0),
            ("JPM", "JPMorgan Chase & Co.", 150.0, 5.0),
            ("V", "Visa Inc.", 250.0, 10.0),
            ("JNJ", "Johnson & Johnson", 160.0, 5.0),
            ("WMT", "Walmart Inc.", 160.0, 5.0),
            ("PG", "Procter & Gamble Co.", 150.0, 5.0),
            ("MA", "Mastercard Inc.", 400.0, 15.0),
            ("UNH", "UnitedHealth Group Inc.", 500.0, 20.0),
            ("HD", "The Home Depot, Inc.", 350.0, 10.0),
            ("DIS", "The Walt Disney Company", 100.0, 5.0),
            ("PYPL", "PayPal Holdings, Inc.", 60.0, 5.0),
            ("BAC", "Bank of America Corp.", 35.0, 2.0),
            ("NFLX", "Netflix, Inc.", 450.0, 20.0),
            ("ADBE", "Adobe Inc.", 550.0, 25.0),
        ]
        .into_iter()
        .map(|(symbol, name, base, range)| ReferenceEntry {
            symbol: symbol.to_string(),
            name: name.to_string(),
            base,
            range,
        })
        .collect();

        ReferenceTable { entries }
    }
}
