use super::util::RetryPolicy;
use crate::core::currency::{CurrencyList, RateSource, RateTable};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, instrument};

const USER_AGENT: &str = "forex/0.1";

/// Live rates and the currency list from exchangerate.host.
pub struct ExchangeRateHostProvider {
    base_url: String,
    access_key: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl ExchangeRateHostProvider {
    pub fn new(base_url: &str, access_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(ExchangeRateHostProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key: access_key.to_string(),
            client,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = Url::parse_with_params(
            &format!("{}/{}", self.base_url, endpoint),
            &[("access_key", self.access_key.as_str())],
        )
        .with_context(|| format!("Invalid rate source URL: {}", self.base_url))?;
        debug!("Requesting {} from {}", endpoint, self.base_url);

        let response = self
            .retry
            .run(endpoint, || async {
                self.client.get(url.clone()).send().await?.error_for_status()
            })
            .await
            .with_context(|| format!("Request to {endpoint} failed"))?;

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read {endpoint} response"))?;

        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {endpoint} response: '{text}'"))
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

impl ApiErrorBody {
    fn describe(&self) -> String {
        match (&self.kind, &self.info) {
            (Some(kind), Some(info)) => format!("{kind}: {info}"),
            (Some(msg), None) | (None, Some(msg)) => msg.clone(),
            (None, None) => "unknown error".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LiveResponse {
    quotes: Option<HashMap<String, f64>>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    currencies: Option<CurrencyList>,
    error: Option<ApiErrorBody>,
}

fn api_error(endpoint: &str, error: Option<ApiErrorBody>) -> anyhow::Error {
    match error {
        Some(body) => anyhow!("Rate source rejected {} request: {}", endpoint, body.describe()),
        None => anyhow!("No data in {} response", endpoint),
    }
}

#[async_trait]
impl RateSource for ExchangeRateHostProvider {
    #[instrument(name = "LiveRatesFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<RateTable> {
        let live: LiveResponse = self.get("live").await?;
        let quotes = live.quotes.ok_or_else(|| api_error("live", live.error))?;
        debug!(quotes = quotes.len(), "Received live quotes");
        Ok(RateTable::from_quotes(quotes, Utc::now()))
    }

    #[instrument(name = "CurrencyListFetch", skip(self))]
    async fn fetch_currencies(&self) -> Result<CurrencyList> {
        let list: ListResponse = self.get("list").await?;
        let currencies = list.currencies.ok_or_else(|| api_error("list", list.error))?;
        debug!(currencies = currencies.len(), "Received currency list");
        Ok(currencies)
    }
}
