//! Drives the conversion form from the command line.
//!
//! The form lives on an in-memory page: the fields are filled in, the amount control fires
//! its change event, the form is submitted, and whatever lands in the display container is
//! printed.

use super::ui;
use crate::core::config::{AppConfig, FormSelectors};
use crate::core::form::{ConversionClient, FormBridge, SubmitEvent, SubmitOutcome};
use crate::core::page::MemoryPage;
use crate::providers::HttpConversionClient;
use anyhow::{Result, anyhow};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub from: String,
    pub to: String,
    pub amount: String,
    pub endpoint: Option<String>,
}

/// What the form showed after one change-and-submit round.
#[derive(Debug)]
pub struct FormReport {
    pub amount: String,
    pub outcome: SubmitOutcome,
    pub display: String,
}

/// Fills the form, normalizes the amount, submits it, and reads back the display.
pub async fn submit_form<C: ConversionClient>(
    selectors: &FormSelectors,
    client: C,
    request: &ConvertRequest,
) -> Result<FormReport> {
    let page = MemoryPage::conversion_form(selectors);
    let bridge = FormBridge::bind(&page, selectors, client)?;

    page.set_value(&selectors.from, &request.from);
    page.set_value(&selectors.to, &request.to);
    page.set_value(&selectors.amount, &request.amount);

    let amount = bridge.normalize_amount();
    let outcome = bridge.submit_conversion(&mut SubmitEvent::new()).await;
    debug!(?outcome, "Form submitted");

    let display = page.inner_html(&selectors.display).unwrap_or_default();
    Ok(FormReport {
        amount,
        outcome,
        display,
    })
}

pub async fn run(config: &AppConfig, request: &ConvertRequest) -> Result<()> {
    let endpoint = request
        .endpoint
        .as_deref()
        .unwrap_or(&config.form.endpoint);
    let client = HttpConversionClient::new(endpoint)?;

    let spinner = ui::new_spinner(&format!("Converting via {}...", client.endpoint()));
    let report = submit_form(&config.form.selectors, client, request).await;
    spinner.finish_and_clear();
    let report = report?;

    println!(
        "{} {} {} {}",
        ui::style_text(&report.amount, ui::StyleType::Subtle),
        ui::style_text(&request.from, ui::StyleType::Subtle),
        ui::style_text("=>", ui::StyleType::Subtle),
        ui::style_text(&request.to, ui::StyleType::Subtle),
    );

    match report.outcome {
        SubmitOutcome::Rendered { .. } => {
            println!("{}", ui::style_text(&report.display, ui::StyleType::Result));
            Ok(())
        }
        SubmitOutcome::Failed { error, .. } => {
            println!("{}", ui::style_text(&report.display, ui::StyleType::Error));
            Err(anyhow!(error).context("Conversion failed"))
        }
        SubmitOutcome::Superseded { ticket, latest } => Err(anyhow!(
            "Submission {ticket} was superseded by submission {latest}"
        )),
    }
}
