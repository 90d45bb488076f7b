use serde_json::json;
use std::time::Duration;
use toolcall::tools::exchange_rate::handle_get_dollar_rate;
use toolcall::tools::{call_tool, ToolRegistry, ToolSettings};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(endpoint: String, timeout: Duration) -> ToolSettings {
    ToolSettings {
        exchange_rate_endpoint: endpoint,
        exchange_rate_timeout: timeout,
        verbose: false,
    }
}

async fn quote_server(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/last/USD-BRL"))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

/// What a tool result looks like to the model after the controller folds
/// errors into text.
async fn dollar_rate_result(settings: ToolSettings) -> String {
    let registry = ToolRegistry::with_builtins(settings);
    match call_tool(&registry, "get_dollar_rate", &json!({})).await {
        Ok(text) => text,
        Err(e) => format!("Error: {}", e),
    }
}

#[tokio::test]
async fn test_returns_bid() {
    let server = quote_server(ResponseTemplate::new(200).set_body_json(json!({
        "USDBRL": {
            "code": "USD",
            "codein": "BRL",
            "name": "Dólar Americano/Real Brasileiro",
            "bid": "5.36874",
            "ask": "5.36974"
        }
    })))
    .await;

    let settings = settings_for(
        format!("{}/last/USD-BRL", server.uri()),
        Duration::from_secs(20),
    );
    let result = dollar_rate_result(settings).await;
    assert_eq!(result, "5.36874");
    let rate: f64 = result.parse().unwrap();
    assert!(rate > 0.0);
}

#[tokio::test]
async fn test_non_success_status_is_error_string() {
    let server = quote_server(ResponseTemplate::new(503)).await;
    let settings = settings_for(
        format!("{}/last/USD-BRL", server.uri()),
        Duration::from_secs(20),
    );

    let result = dollar_rate_result(settings).await;
    assert_eq!(result, "Error: Exchange rate service returned status 503");
}

#[tokio::test]
async fn test_unexpected_shape_is_error_string() {
    let server =
        quote_server(ResponseTemplate::new(200).set_body_json(json!({"status": 404}))).await;
    let settings = settings_for(
        format!("{}/last/USD-BRL", server.uri()),
        Duration::from_secs(20),
    );

    let result = dollar_rate_result(settings).await;
    assert!(result.starts_with("Error:"), "got {}", result);
    assert!(result.contains("USDBRL.bid"));
}

#[tokio::test]
async fn test_non_json_body_is_error() {
    let server = quote_server(ResponseTemplate::new(200).set_body_string("<html>down</html>")).await;
    let settings = settings_for(
        format!("{}/last/USD-BRL", server.uri()),
        Duration::from_secs(20),
    );

    let err = handle_get_dollar_rate(&settings).await.unwrap_err();
    assert!(err.starts_with("Invalid exchange rate response"));
}

#[tokio::test]
async fn test_timeout_is_error_string() {
    let server = quote_server(
        ResponseTemplate::new(200)
            .set_body_json(json!({"USDBRL": {"bid": "5.1"}}))
            .set_delay(Duration::from_secs(3)),
    )
    .await;
    let settings = settings_for(
        format!("{}/last/USD-BRL", server.uri()),
        Duration::from_millis(200),
    );

    let err = handle_get_dollar_rate(&settings).await.unwrap_err();
    assert!(err.contains("timed out"), "got {}", err);
}

#[tokio::test]
async fn test_connection_failure_is_error_string() {
    let settings = settings_for(
        "http://127.0.0.1:9/last/USD-BRL".to_string(),
        Duration::from_secs(2),
    );

    let result = dollar_rate_result(settings).await;
    assert!(result.starts_with("Error:"), "got {}", result);
}
