//! Binds the conversion form to the conversion endpoint.
//!
//! [`FormBridge`] reacts to two form events. An amount change rewrites the amount field as
//! a two-decimal string. A submit reads source currency, target currency and amount
//! verbatim, sends them to the endpoint, and writes the returned markup into the display
//! container.
//!
//! Each submission takes a ticket from a monotonically increasing counter. When a request
//! completes, its result is applied only if no newer submission has been issued since, so a
//! slow response can never overwrite the result of a later one.

use crate::core::amount;
use crate::core::config::FormSelectors;
use crate::core::page::{Element, Page};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// The three form values sent to the conversion endpoint, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionQuery {
    pub from: String,
    pub to: String,
    pub amount: String,
}

impl ConversionQuery {
    /// Query parameters in request order.
    pub fn params(&self) -> [(&'static str, &str); 3] {
        [
            ("from", &self.from),
            ("to", &self.to),
            ("amount", &self.amount),
        ]
    }
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Invalid conversion endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("Request error: {0}")]
    Transport(String),
    #[error("HTTP error: {status} from conversion endpoint")]
    Status { status: u16, body: String },
}

/// Sends a conversion query and returns the rendered fragment.
#[async_trait]
pub trait ConversionClient: Send + Sync {
    async fn convert(&self, query: &ConversionQuery) -> Result<String, ConversionError>;
}

#[async_trait]
impl<T: ConversionClient + ?Sized> ConversionClient for Arc<T> {
    async fn convert(&self, query: &ConversionQuery) -> Result<String, ConversionError> {
        (**self).convert(query).await
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("Element not found: #{0}")]
    MissingElement(String),
}

/// A form submission. Handling it always suppresses the default navigation.
#[derive(Debug, Default)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug)]
pub enum FormEvent {
    /// The amount control fired `change`
    AmountChanged,
    /// The form fired `submit`
    Submit(SubmitEvent),
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// The response body was written to the display container
    Rendered { ticket: u64 },
    /// The request failed and an error notice was written to the display container
    Failed {
        ticket: u64,
        error: ConversionError,
    },
    /// A newer submission was issued before this one completed; the result was dropped
    Superseded { ticket: u64, latest: u64 },
}

impl SubmitOutcome {
    pub fn ticket(&self) -> u64 {
        match self {
            SubmitOutcome::Rendered { ticket }
            | SubmitOutcome::Failed { ticket, .. }
            | SubmitOutcome::Superseded { ticket, .. } => *ticket,
        }
    }
}

#[derive(Debug)]
pub enum DispatchOutcome {
    Normalized(String),
    Submitted(SubmitOutcome),
}

pub struct FormBridge<C: ConversionClient> {
    from: Arc<dyn Element>,
    to: Arc<dyn Element>,
    amount: Arc<dyn Element>,
    display: Arc<dyn Element>,
    form: Arc<dyn Element>,
    client: C,
    issued: AtomicU64,
    // Held from the ticket check through the display write
    render: Mutex<()>,
}

impl<C: ConversionClient> FormBridge<C> {
    /// Looks up the five form elements on `page`. Fails on the first missing one.
    pub fn bind(page: &dyn Page, selectors: &FormSelectors, client: C) -> Result<Self, BindError> {
        let lookup = |id: &str| {
            page.element(id)
                .ok_or_else(|| BindError::MissingElement(id.to_string()))
        };

        let bridge = FormBridge {
            from: lookup(&selectors.from)?,
            to: lookup(&selectors.to)?,
            amount: lookup(&selectors.amount)?,
            display: lookup(&selectors.display)?,
            form: lookup(&selectors.form)?,
            client,
            issued: AtomicU64::new(0),
            render: Mutex::new(()),
        };
        debug!(form = %selectors.form, "Bound conversion form");
        Ok(bridge)
    }

    /// Routes a form event to its handler.
    pub async fn dispatch(&self, event: &mut FormEvent) -> DispatchOutcome {
        match event {
            FormEvent::AmountChanged => DispatchOutcome::Normalized(self.normalize_amount()),
            FormEvent::Submit(submit) => {
                DispatchOutcome::Submitted(self.submit_conversion(submit).await)
            }
        }
    }

    /// Rewrites the amount field with two fraction digits and returns the new value.
    pub fn normalize_amount(&self) -> String {
        let raw = self.amount.value();
        let normalized = amount::normalize_amount(&raw);
        debug!(raw = %raw, normalized = %normalized, "Normalized amount");
        self.amount.set_value(&normalized);
        normalized
    }

    /// Sends the current form values and applies the result if it is still the latest.
    pub async fn submit_conversion(&self, event: &mut SubmitEvent) -> SubmitOutcome {
        event.prevent_default();

        let query = self.read_query();
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        info!(ticket, from = %query.from, to = %query.to, amount = %query.amount, "Submitting conversion");

        let result = self.client.convert(&query).await;

        let _render = self.render.lock().unwrap_or_else(PoisonError::into_inner);
        let latest = self.issued.load(Ordering::SeqCst);
        if ticket != latest {
            debug!(ticket, latest, "Dropping result of superseded submission");
            return SubmitOutcome::Superseded { ticket, latest };
        }

        match result {
            Ok(markup) => {
                debug!(ticket, "Rendering conversion result");
                self.display.set_inner_html(&markup);
                SubmitOutcome::Rendered { ticket }
            }
            Err(error) => {
                warn!(ticket, error = %error, "Conversion request failed");
                self.display.set_inner_html(&error_notice(&error));
                SubmitOutcome::Failed { ticket, error }
            }
        }
    }

    /// Reads the form values without validation.
    pub fn read_query(&self) -> ConversionQuery {
        ConversionQuery {
            from: self.from.value(),
            to: self.to.value(),
            amount: self.amount.value(),
        }
    }

    /// Number of submissions issued so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    pub fn form(&self) -> &Arc<dyn Element> {
        &self.form
    }
}

fn error_notice(error: &ConversionError) -> String {
    let detail = match error {
        ConversionError::Status { body, .. } => match body_message(body) {
            Some(message) => format!("{error}: {message}"),
            None => error.to_string(),
        },
        _ => error.to_string(),
    };
    format!(
        r#"<span class="error">Conversion failed: {}</span>"#,
        escape_html(&detail)
    )
}

/// The `message` of a JSON error body, if the body is one.
fn body_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("message")?.as_str().map(str::to_string)
}

/// Escapes text for inclusion in markup.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
