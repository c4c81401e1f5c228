use forex::core::config::FormSelectors;
use forex::core::form::{FormBridge, FormEvent, SubmitEvent, SubmitOutcome};
use forex::core::forex::Forex;
use forex::core::page::MemoryPage;
use forex::providers::util::RetryPolicy;
use forex::providers::{ExchangeRateHostProvider, HttpConversionClient};
use forex::store::disk::DiskRateStore;
use forex::store::memory::MemoryRateStore;
use std::fs;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const LIVE: &str = r#"{
        "success": true,
        "source": "USD",
        "quotes": { "USDEUR": 0.5, "USDGBP": 0.25 }
    }"#;

    pub const LIST: &str = r#"{
        "success": true,
        "currencies": {
            "EUR": "Euro",
            "GBP": "British Pound Sterling",
            "USD": "United States Dollar"
        }
    }"#;

    /// A rate source answering `live` and `list` with the given status.
    pub async fn create_rate_source(status: u16) -> MockServer {
        let mock_server = MockServer::start().await;

        for (endpoint, body) in [("/live", LIVE), ("/list", LIST)] {
            Mock::given(method("GET"))
                .and(path(endpoint))
                .and(query_param("access_key", "test-key"))
                .respond_with(ResponseTemplate::new(status).set_body_string(body))
                .mount(&mock_server)
                .await;
        }

        mock_server
    }

    /// A conversion endpoint answering every query with `reply`.
    pub async fn create_conversion_endpoint(reply: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/conv"))
            .and(query_param("from", "USD"))
            .and(query_param("to", "EUR"))
            .respond_with(ResponseTemplate::new(200).set_body_string(reply))
            .mount(&mock_server)
            .await;

        mock_server
    }
}

fn rate_source(mock_server: &wiremock::MockServer) -> ExchangeRateHostProvider {
    ExchangeRateHostProvider::new(&mock_server.uri(), "test-key")
        .expect("Failed to create provider")
        .with_retry_policy(RetryPolicy::none())
}

#[test_log::test(tokio::test)]
async fn test_form_against_running_server() {
    let rates = test_utils::create_rate_source(200).await;
    let forex = Forex::load(&rate_source(&rates), &MemoryRateStore::new())
        .await
        .expect("Failed to load rates");

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(forex::server::run(listener, Arc::new(forex), async move {
        let _ = stopped.await;
    }));

    let selectors = FormSelectors::default();
    let page = MemoryPage::conversion_form(&selectors);
    let client = HttpConversionClient::new(&format!("http://{addr}/conv"))
        .expect("Failed to create client");
    let bridge = FormBridge::bind(&page, &selectors, client).expect("Form did not bind");

    page.set_value(&selectors.from, "USD");
    page.set_value(&selectors.to, "EUR");
    page.set_value(&selectors.amount, "7.5");
    bridge.dispatch(&mut FormEvent::AmountChanged).await;
    assert_eq!(page.value(&selectors.amount).as_deref(), Some("7.50"));

    let mut submit = SubmitEvent::new();
    let outcome = bridge.submit_conversion(&mut submit).await;
    info!(?outcome, "Submitted form");
    assert!(submit.default_prevented());
    assert!(matches!(outcome, SubmitOutcome::Rendered { ticket: 1 }));
    assert_eq!(
        page.inner_html(&selectors.display).as_deref(),
        Some("&euro; 3.75")
    );

    // Unknown currencies come back as a 400 and show up as a failure notice
    page.set_value(&selectors.to, "FFF");
    let outcome = bridge.submit_conversion(&mut SubmitEvent::new()).await;
    assert!(matches!(outcome, SubmitOutcome::Failed { ticket: 2, .. }));
    let display = page.inner_html(&selectors.display).unwrap_or_default();
    assert!(display.contains("Conversion failed"), "{display}");

    stop.send(()).expect("Server already stopped");
    server
        .await
        .expect("Server task panicked")
        .expect("Server failed");
}

#[test_log::test(tokio::test)]
async fn test_form_renders_reply_verbatim() {
    let endpoint = test_utils::create_conversion_endpoint("15.00 EUR").await;

    let selectors = FormSelectors::default();
    let page = MemoryPage::conversion_form(&selectors);
    let client = HttpConversionClient::new(&format!("{}/conv", endpoint.uri()))
        .expect("Failed to create client");
    let bridge = FormBridge::bind(&page, &selectors, client).expect("Form did not bind");

    page.set_value(&selectors.from, "USD");
    page.set_value(&selectors.to, "EUR");
    page.set_value(&selectors.amount, "10");

    let mut event = FormEvent::Submit(SubmitEvent::new());
    bridge.dispatch(&mut event).await;

    assert_eq!(
        page.inner_html(&selectors.display).as_deref(),
        Some("15.00 EUR")
    );
    assert_eq!(page.value(&selectors.amount).as_deref(), Some("10"));
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_convert_command() {
    let endpoint = test_utils::create_conversion_endpoint("<b>&euro; 4.58</b>").await;

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    let config_content = format!(
        r#"
        form:
          endpoint: "{}/conv"
    "#,
        endpoint.uri()
    );
    fs::write(config_path, &config_content).expect("Failed to write config file");

    let result = forex::run_command(
        forex::AppCommand::Convert(forex::cli::convert::ConvertRequest {
            from: "USD".to_string(),
            to: "EUR".to_string(),
            amount: "5".to_string(),
            endpoint: None,
        }),
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Convert command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_convert_command_reports_unreachable_endpoint() {
    let result = forex::run_command(
        forex::AppCommand::Convert(forex::cli::convert::ConvertRequest {
            from: "USD".to_string(),
            to: "EUR".to_string(),
            amount: "5".to_string(),
            endpoint: Some("http://127.0.0.1:9/conv".to_string()),
        }),
        None,
    )
    .await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_rates_survive_provider_outage() {
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = DiskRateStore::open(&data_dir.path().join("backup")).expect("Failed to open store");

    let healthy = test_utils::create_rate_source(200).await;
    let fresh = Forex::load(&rate_source(&healthy), &store)
        .await
        .expect("Failed to load rates");

    let broken = test_utils::create_rate_source(500).await;
    let restored = Forex::load(&rate_source(&broken), &store)
        .await
        .expect("Backup was not used");

    assert_eq!(restored.table(), fresh.table());
    assert_eq!(restored.supported(), fresh.supported());
    assert_eq!(restored.conv_string("USD", "GBP", 8.0).unwrap(), "&pound; 2.00");
}
