use super::ui;
use crate::validator::SymbolValidator;
use anyhow::Result;
use comfy_table::Cell;

pub async fn run(validator: &SymbolValidator, query: &str) -> Result<()> {
    let hits = validator.search(query).await;
    if hits.is_empty() {
        println!(
            "{}",
            ui::style_text("No matching symbols found.", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Symbol"), ui::header_cell("Name")]);
    for hit in &hits {
        table.add_row(vec![Cell::new(&hit.symbol), Cell::new(&hit.name)]);
    }

    println!("{table}");
    Ok(())
}
