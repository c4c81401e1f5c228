use crate::core::form::escape_html;
use crate::core::forex::{Forex, ForexError};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// Query string of `GET /conv`. Every field is optional so missing ones can be reported.
#[derive(Debug, Deserialize)]
pub struct ConvQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub amount: Option<String>,
}

/// A rejected conversion, answered with 400 and a JSON body.
#[derive(Debug, PartialEq)]
pub enum ConvRejection {
    /// A parameter is missing
    Type(String),
    /// The amount is not a number, negative, or not finite
    Value(String),
    /// The currency has no rate
    Key(String),
}

impl ConvRejection {
    fn kind(&self) -> &'static str {
        match self {
            ConvRejection::Type(_) => "Type Error",
            ConvRejection::Value(_) => "Value Error",
            ConvRejection::Key(_) => "Key Error",
        }
    }

    fn message(&self) -> &str {
        match self {
            ConvRejection::Type(msg) | ConvRejection::Value(msg) | ConvRejection::Key(msg) => msg,
        }
    }
}

impl From<ForexError> for ConvRejection {
    fn from(err: ForexError) -> Self {
        match err {
            ForexError::UnknownCurrency(_) => ConvRejection::Key(err.to_string()),
            ForexError::NegativeAmount | ForexError::NonFiniteAmount => {
                ConvRejection::Value(err.to_string())
            }
        }
    }
}

impl IntoResponse for ConvRejection {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.kind(), "message": self.message() });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ConvRejection> {
    value
        .as_deref()
        .ok_or_else(|| ConvRejection::Type(format!("Missing query parameter: {name}")))
}

/// Validates the query and renders the converted amount.
pub fn conversion_reply(forex: &Forex, query: &ConvQuery) -> Result<String, ConvRejection> {
    let from = required(&query.from, "from")?;
    let to = required(&query.to, "to")?;
    let raw_amount = required(&query.amount, "amount")?;

    let amount: f64 = raw_amount
        .trim()
        .parse()
        .map_err(|_| ConvRejection::Value(format!("could not convert string to float: '{raw_amount}'")))?;
    Forex::validate(amount)?;

    Ok(forex.conv_string(from, to, amount)?)
}

/// GET /conv - Convert an amount between two currencies
pub async fn convert(
    State(forex): State<Arc<Forex>>,
    Query(query): Query<ConvQuery>,
) -> Response {
    match conversion_reply(&forex, &query) {
        Ok(reply) => {
            debug!(?query, %reply, "Conversion succeeded");
            (StatusCode::OK, Html(reply)).into_response()
        }
        Err(rejection) => {
            warn!(?query, error = rejection.kind(), message = rejection.message(), "Conversion rejected");
            rejection.into_response()
        }
    }
}

/// GET / - The conversion form
pub async fn home(State(forex): State<Arc<Forex>>) -> Html<String> {
    Html(render_home(&forex))
}

pub fn render_home(forex: &Forex) -> String {
    let options: String = forex
        .supported()
        .iter()
        .map(|(code, name)| {
            format!(
                r#"<option value="{code}">{code} - {name}</option>"#,
                code = escape_html(code),
                name = escape_html(name)
            )
        })
        .collect::<Vec<_>>()
        .join("\n          ");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Home</title>
  </head>
  <body>
    <h1>Currency Converter</h1>
    <form action="/exhange" id="con-form">
      <label for="con-from">From</label>
      <select id="con-from" name="from">
          {options}
      </select>
      <label for="con-to">To</label>
      <select id="con-to" name="to">
          {options}
      </select>
      <label for="currency-amount">Amount</label>
      <input id="currency-amount" name="amount" type="number" min="0" step="0.01" value="0.00">
      <button type="submit">Convert</button>
    </form>
    <div id="messages"></div>
  </body>
</html>
"#
    )
}
