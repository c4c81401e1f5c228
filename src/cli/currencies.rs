use super::ui;
use crate::core::config::AppConfig;
use crate::core::currency::CurrencyRateProvider;
use crate::core::forex::Forex;
use crate::core::symbols;
use anyhow::Result;
use comfy_table::{Cell, Table};
use tracing::debug;

/// Builds the table of supported currencies with their rate against `base`.
pub async fn currency_table(forex: &Forex, rates: &dyn CurrencyRateProvider, base: &str) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Name"),
        ui::header_cell("Symbol"),
        ui::header_cell(&format!("Per 1 {base}")),
    ]);

    for (code, name) in forex.supported() {
        let rate = match rates.get_rate(base, code).await {
            Ok(rate) => Some(rate),
            Err(e) => {
                debug!("No rate for {}/{}: {}", base, code, e);
                None
            }
        };
        table.add_row(vec![
            Cell::new(code),
            Cell::new(name),
            Cell::new(symbols::symbol_or_code(code)),
            ui::rate_cell(rate),
        ]);
    }
    table
}

pub async fn run(config: &AppConfig, base: &str) -> Result<()> {
    let spinner = ui::new_spinner("Fetching currencies...");
    let forex = super::load_forex(config).await;
    spinner.finish_and_clear();
    let forex = forex?;

    println!(
        "{}",
        ui::style_text(
            &format!("Supported currencies (rates as of {})", forex.table().fetched_at),
            ui::StyleType::Title
        )
    );
    println!("{}", currency_table(&forex, &forex, base).await);
    Ok(())
}
