use crate::core::form::{ConversionClient, ConversionError, ConversionQuery};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, instrument};

const USER_AGENT: &str = "forex/0.1";

/// Sends form queries to the conversion endpoint over HTTP.
///
/// One GET per query. No timeout and no retry: a failure is returned to the form as is.
pub struct HttpConversionClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpConversionClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(HttpConversionClient {
            endpoint: endpoint.to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ConversionClient for HttpConversionClient {
    #[instrument(
        name = "ConversionRequest",
        skip(self, query),
        fields(from = %query.from, to = %query.to, amount = %query.amount)
    )]
    async fn convert(&self, query: &ConversionQuery) -> Result<String, ConversionError> {
        let url = Url::parse_with_params(&self.endpoint, query.params()).map_err(|e| {
            ConversionError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            }
        })?;
        debug!("Requesting conversion from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ConversionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ConversionError::Transport(e.to_string()))?;
        debug!(%status, bytes = body.len(), "Received conversion response");

        if !status.is_success() {
            return Err(ConversionError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn query(from: &str, to: &str, amount: &str) -> ConversionQuery {
        ConversionQuery {
            from: from.to_string(),
            to: to.to_string(),
            amount: amount.to_string(),
        }
    }

    #[tokio::test]
    async fn test_request_shape() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/conv"))
            .and(query_param("from", "USD"))
            .and(query_param("to", "EUR"))
            .and(query_param("amount", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<span>9.15</span>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpConversionClient::new(&format!("{}/conv", mock_server.uri())).unwrap();
        let body = client.convert(&query("USD", "EUR", "10")).await.unwrap();
        assert_eq!(body, "<span>9.15</span>");
    }

    #[tokio::test]
    async fn test_empty_amount_is_sent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/conv"))
            .and(query_param("amount", ""))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpConversionClient::new(&format!("{}/conv", mock_server.uri())).unwrap();
        assert_eq!(client.convert(&query("USD", "EUR", "")).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_error_status_keeps_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/conv"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error": "Key Error", "message": "Unknown currency: FFF"}"#),
            )
            .mount(&mock_server)
            .await;

        let client = HttpConversionClient::new(&format!("{}/conv", mock_server.uri())).unwrap();
        match client.convert(&query("USD", "FFF", "10")).await {
            Err(ConversionError::Status { status, body }) => {
                assert_eq!(status, 400);
                assert!(body.contains("Unknown currency: FFF"));
            }
            other => panic!("Expected a status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        // Nothing listens on port 9 locally
        let client = HttpConversionClient::new("http://127.0.0.1:9/conv").unwrap();
        let result = client.convert(&query("USD", "EUR", "1")).await;
        assert!(matches!(result, Err(ConversionError::Transport(_))));
    }

    #[tokio::test]
    async fn test_invalid_endpoint() {
        let client = HttpConversionClient::new("/conv").unwrap();
        let result = client.convert(&query("USD", "EUR", "1")).await;
        assert!(matches!(
            result,
            Err(ConversionError::InvalidEndpoint { .. })
        ));
    }
}
