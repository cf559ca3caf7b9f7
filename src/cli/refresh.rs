use super::ui;
use crate::core::asset::AssetKind;
use crate::resolver::PriceResolver;
use crate::store::PriceStore;
use anyhow::Result;
use tracing::warn;

/// One interactive pass over all tracked stock assets, with progress.
/// Mirrors the scheduler's pass semantics: sequential, per-asset failure
/// isolation, report at the end.
pub async fn run(resolver: &PriceResolver, store: &PriceStore) -> Result<()> {
    let stocks = store.assets_of_kind(AssetKind::Stock)?;
    if stocks.is_empty() {
        println!(
            "{}",
            ui::style_text("No stock assets to refresh.", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    let pb = ui::new_progress_bar(stocks.len() as u64, true);
    pb.set_message("Fetching prices...");

    let mut updated = 0;
    for asset in &stocks {
        match resolver.resolve_price(asset).await {
            Ok(_) => updated += 1,
            Err(e) => warn!(symbol = %asset.symbol, error = %e, "Failed to refresh asset"),
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!(
        "Updated {} prices",
        ui::style_text(&format!("{updated}/{}", stocks.len()), ui::StyleType::Success)
    );
    Ok(())
}
