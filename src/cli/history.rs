use super::ui;
use crate::store::PriceStore;
use anyhow::{Result, bail};
use comfy_table::Cell;

pub fn run(store: &PriceStore, symbol: &str, limit: usize) -> Result<()> {
    // The stored symbol may be an upper stock ticker or a lower crypto id.
    let asset = match store.get_asset(&symbol.to_uppercase())? {
        Some(asset) => asset,
        None => match store.get_asset(&symbol.to_lowercase())? {
            Some(asset) => asset,
            None => bail!("Asset '{}' is not tracked", symbol),
        },
    };

    let points = store.history(&asset.symbol, limit)?;
    if points.is_empty() {
        println!(
            "{}",
            ui::style_text("No price history recorded yet.", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    println!(
        "History: {} ({})\n",
        ui::style_text(&asset.symbol, ui::StyleType::Title),
        asset.name
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Time"), ui::header_cell("Price")]);
    for point in &points {
        table.add_row(vec![
            Cell::new(point.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
            ui::format_optional_cell(Some(point.price), |p| format!("{p:.2}")),
        ]);
    }

    println!("{table}");
    Ok(())
}
