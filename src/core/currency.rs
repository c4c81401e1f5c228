//! Currency conversion abstractions

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// The currency all rates are quoted against.
pub const REFERENCE_CURRENCY: &str = "USD";

/// Currency code to display name.
pub type CurrencyList = BTreeMap<String, String>;

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64>;
}

/// A source of live exchange rates.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self) -> Result<RateTable>;
    async fn fetch_currencies(&self) -> Result<CurrencyList>;
}

/// Units of each currency per one unit of [`REFERENCE_CURRENCY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub rates: BTreeMap<String, f64>,
    pub fetched_at: DateTime<Utc>,
}

impl RateTable {
    /// Builds a table from quotes keyed by currency pair (`USDEUR`), keeping the quoted code.
    pub fn from_quotes(quotes: HashMap<String, f64>, fetched_at: DateTime<Utc>) -> Self {
        let mut rates: BTreeMap<String, f64> = quotes
            .into_iter()
            .map(|(pair, rate)| {
                let split = pair.len().saturating_sub(3);
                let code = pair.get(split..).unwrap_or(&pair).to_uppercase();
                (code, rate)
            })
            .collect();
        rates.insert(REFERENCE_CURRENCY.to_string(), 1.0);
        RateTable { rates, fetched_at }
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
