pub mod cli;
pub mod core;
pub mod providers;
pub mod server;
pub mod store;

use crate::cli::convert::ConvertRequest;
use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Serve,
    Convert(ConvertRequest),
    Currencies { base: String },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Forex starting...");

    let config = AppConfig::load_or_default(config_path)?;
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Serve => cli::serve::run(&config).await,
        AppCommand::Convert(request) => cli::convert::run(&config, &request).await,
        AppCommand::Currencies { base } => cli::currencies::run(&config, &base).await,
    }
}
