use super::ui;
use crate::core::config::AppConfig;
use crate::server;
use anyhow::Result;
use std::sync::Arc;

pub async fn run(config: &AppConfig) -> Result<()> {
    let spinner = ui::new_spinner("Loading exchange rates...");
    let forex = super::load_forex(config).await;
    spinner.finish_and_clear();
    let forex = forex?;

    println!(
        "{} {}",
        ui::style_text("Serving currency conversion on", ui::StyleType::Title),
        ui::style_text(&format!("http://{}", config.server.bind), ui::StyleType::Result)
    );
    server::serve(&config.server, Arc::new(forex)).await
}
