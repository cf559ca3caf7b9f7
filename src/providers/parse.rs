//! Price extraction from upstream JSON payloads
//!
//! The quote APIs are not contractually stable: the same logical price can
//! arrive nested under a chart meta block, a quoteSummary module, a flat
//! `price` object, or as an array of historical closes. Each known shape
//! gets one pure extractor; adapters apply their extractors in order and
//! take the first finite, positive hit.

use serde_json::Value;

pub type PriceExtractor = fn(&Value) -> Option<f64>;

/// Accepts both `{"raw": 123.4}` wrappers and bare numbers.
fn raw_or_number(value: &Value) -> Option<f64> {
    match value {
        Value::Object(map) => map.get("raw").and_then(Value::as_f64),
        other => other.as_f64(),
    }
}

fn price_field(obj: &Value, field: &str) -> Option<f64> {
    obj.get(field).and_then(raw_or_number)
}

/// `chart.result[0].meta.{regularMarketPrice,previousClose,currentPrice}`
pub fn from_chart_meta(value: &Value) -> Option<f64> {
    let meta = value.get("chart")?.get("result")?.get(0)?.get("meta")?;
    price_field(meta, "regularMarketPrice")
        .or_else(|| price_field(meta, "previousClose"))
        .or_else(|| price_field(meta, "currentPrice"))
}

/// `quoteSummary.result[0].price.{regularMarketPrice,currentPrice}`
pub fn from_quote_summary(value: &Value) -> Option<f64> {
    let price = value
        .get("quoteSummary")?
        .get("result")?
        .get(0)?
        .get("price")?;
    price_field(price, "regularMarketPrice").or_else(|| price_field(price, "currentPrice"))
}

/// Top-level `price.{regularMarketPrice,currentPrice}`
pub fn from_flat_price(value: &Value) -> Option<f64> {
    let price = value.get("price")?;
    price_field(price, "regularMarketPrice").or_else(|| price_field(price, "currentPrice"))
}

/// `timeseries.result[0].indicators.quote[0].close[]`, latest non-null entry
pub fn from_timeseries_closes(value: &Value) -> Option<f64> {
    let closes = value
        .get("timeseries")?
        .get("result")?
        .get(0)?
        .get("indicators")?
        .get("quote")?
        .get(0)?
        .get("close")?
        .as_array()?;
    closes.iter().rev().find_map(raw_or_number)
}

/// Applies extractors in priority order. A hit must be a finite, positive
/// number to count; anything else falls through to the next shape.
pub fn first_price(value: &Value, extractors: &[PriceExtractor]) -> Option<f64> {
    extractors
        .iter()
        .filter_map(|extract| extract(value))
        .find(|price| price.is_finite() && *price > 0.0)
}
