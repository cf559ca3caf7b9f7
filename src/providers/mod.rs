pub mod coingecko;
pub mod parse;
pub mod rapidapi;
pub mod util;
pub mod yahoo;

// Re-export adapters for cleaner wiring
pub use coingecko::CoinGeckoProvider;
pub use rapidapi::{RapidApiQuoteProvider, RapidApiSearchProvider};
pub use yahoo::{YahooChartProvider, YahooSummaryProvider};
