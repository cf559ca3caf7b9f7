//! Core business logic abstractions

pub mod asset;
pub mod error;
pub mod log;
pub mod quote;
pub mod reference;

// Re-export main types for cleaner imports
pub use asset::{Asset, AssetKind, PricePoint};
pub use error::ProviderError;
pub use quote::{QuoteProvider, SearchHit, SymbolSearchProvider};
pub use reference::{ReferenceEntry, ReferenceTable};
