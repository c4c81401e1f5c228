pub mod convert;
pub mod currencies;
pub mod serve;
pub mod setup;
pub mod ui;

use crate::core::config::AppConfig;
use crate::core::forex::Forex;
use crate::providers::ExchangeRateHostProvider;
use crate::store;
use anyhow::{Context, Result};

/// Loads exchange rates with the configured provider and backup store.
pub async fn load_forex(config: &AppConfig) -> Result<Forex> {
    let provider_config = config
        .providers
        .exchangerate_host
        .as_ref()
        .context("No exchange rate provider configured (providers.exchangerate_host)")?;
    let provider =
        ExchangeRateHostProvider::new(&provider_config.base_url, &provider_config.access_key)?;
    let store = store::open_default(config);

    Forex::load(&provider, store.as_ref()).await
}
