use super::ui;
use crate::store::PriceStore;
use anyhow::Result;
use comfy_table::Cell;

pub fn run(store: &PriceStore) -> Result<()> {
    let mut assets = store.list_assets()?;
    if assets.is_empty() {
        println!(
            "{}",
            ui::style_text("No tracked assets. Add one with `quotewatch add <symbol>`.", ui::StyleType::Subtle)
        );
        return Ok(());
    }
    assets.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Symbol"),
        ui::header_cell("Kind"),
        ui::header_cell("Name"),
        ui::header_cell("Price"),
        ui::header_cell("Updated"),
    ]);

    for asset in &assets {
        let price = ui::format_optional_cell(asset.current_price, |p| format!("{p:.2}"));
        let updated = if asset.current_price.is_some() {
            asset.last_updated.format("%Y-%m-%d %H:%M:%S").to_string()
        } else {
            "never".to_string()
        };

        table.add_row(vec![
            Cell::new(&asset.symbol),
            Cell::new(asset.kind.to_string()),
            Cell::new(&asset.name),
            price,
            Cell::new(updated),
        ]);
    }

    println!("{table}");
    Ok(())
}
