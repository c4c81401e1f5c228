//! Currency conversion against a USD-relative rate table.

use crate::core::amount::round_to_cents;
use crate::core::currency::{
    CurrencyList, CurrencyRateProvider, REFERENCE_CURRENCY, RateSource, RateTable,
};
use crate::core::symbols;
use crate::store::{self, CURRENCIES_KEY, RATES_KEY, RateStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error, PartialEq)]
pub enum ForexError {
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
    #[error("The value is less than 0. It should be a non-negative number.")]
    NegativeAmount,
    #[error("The value is not a finite number.")]
    NonFiniteAmount,
}

#[derive(Debug, Clone)]
pub struct Forex {
    table: RateTable,
    supported: CurrencyList,
}

impl Forex {
    /// Builds a converter, keeping only currencies the table has a rate for.
    pub fn new(table: RateTable, currencies: CurrencyList) -> Self {
        let supported = currencies
            .into_iter()
            .filter(|(code, _)| table.contains(code))
            .collect();
        Forex { table, supported }
    }

    /// Fetches live rates and currencies, falling back to the last backup for each.
    ///
    /// Fails only when neither live nor backed-up rates are available.
    pub async fn load(source: &dyn RateSource, store: &dyn RateStore) -> Result<Self> {
        let (rates, currencies) =
            futures::join!(source.fetch_rates(), source.fetch_currencies());

        let table = match rates {
            Ok(table) => {
                if let Err(e) = store::save(store, RATES_KEY, &table) {
                    warn!("Failed to back up rates: {e:#}");
                }
                table
            }
            Err(e) => {
                warn!("Failed to fetch live rates: {e:#}. Using backup");
                store::load::<RateTable>(store, RATES_KEY)?
                    .with_context(|| format!("No backed up rates available after: {e:#}"))?
            }
        };

        let currencies = match currencies {
            Ok(list) => {
                if let Err(e) = store::save(store, CURRENCIES_KEY, &list) {
                    warn!("Failed to back up currency list: {e:#}");
                }
                list
            }
            Err(e) => {
                warn!("Failed to fetch currency list: {e:#}. Using backup");
                match store::load::<CurrencyList>(store, CURRENCIES_KEY)? {
                    Some(list) => list,
                    None => {
                        warn!("No backed up currency list, naming currencies by code");
                        table
                            .rates
                            .keys()
                            .map(|code| (code.clone(), code.clone()))
                            .collect()
                    }
                }
            }
        };

        let forex = Forex::new(table, currencies);
        info!(
            rates = forex.table.len(),
            supported = forex.supported.len(),
            fetched_at = %forex.table.fetched_at,
            "Loaded exchange rates"
        );
        Ok(forex)
    }

    pub fn table(&self) -> &RateTable {
        &self.table
    }

    pub fn supported(&self) -> &CurrencyList {
        &self.supported
    }

    fn rate(&self, code: &str) -> Result<f64, ForexError> {
        self.table
            .rate(code)
            .ok_or_else(|| ForexError::UnknownCurrency(code.to_string()))
    }

    /// Converts `amount` through the reference currency, rounded to cents.
    pub fn convert(&self, from: &str, to: &str, amount: f64) -> Result<f64, ForexError> {
        let result = if from == to {
            self.rate(from)?;
            amount
        } else if from == REFERENCE_CURRENCY {
            amount * self.rate(to)?
        } else if to == REFERENCE_CURRENCY {
            amount / self.rate(from)?
        } else {
            amount / self.rate(from)? * self.rate(to)?
        };
        debug!(from, to, amount, result, "Converted");
        Ok(round_to_cents(result))
    }

    /// Accepts finite, non-negative amounts.
    pub fn validate(amount: f64) -> Result<(), ForexError> {
        if !amount.is_finite() {
            Err(ForexError::NonFiniteAmount)
        } else if amount < 0.0 {
            Err(ForexError::NegativeAmount)
        } else {
            Ok(())
        }
    }

    /// Converts and renders the result as `"<symbol> <amount>"`.
    pub fn conv_string(&self, from: &str, to: &str, amount: f64) -> Result<String, ForexError> {
        let converted = self.convert(from, to, amount)?;
        Ok(format!("{} {:.2}", symbols::symbol_or_code(to), converted))
    }
}

#[async_trait]
impl CurrencyRateProvider for Forex {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        Ok(self.rate(to)? / self.rate(from)?)
    }
}
