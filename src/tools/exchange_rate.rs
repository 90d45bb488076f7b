use serde_json::Value;

use super::registry::ToolSettings;

pub const DEFAULT_ENDPOINT: &str = "https://economia.awesomeapi.com.br/last/USD-BRL";

/// Fetch the current USD to BRL bid price from the quote service.
pub async fn handle_get_dollar_rate(settings: &ToolSettings) -> Result<String, String> {
    let client = reqwest::Client::builder()
        .timeout(settings.exchange_rate_timeout)
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

    let response = client
        .get(&settings.exchange_rate_endpoint)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                format!(
                    "Exchange rate request timed out after {} seconds",
                    settings.exchange_rate_timeout.as_secs()
                )
            } else {
                format!("Exchange rate request failed: {}", e)
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!(
            "Exchange rate service returned status {}",
            status.as_u16()
        ));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| format!("Invalid exchange rate response: {}", e))?;

    extract_bid(&body)
}

/// Pull `USDBRL.bid` out of a quote payload.
pub fn extract_bid(body: &Value) -> Result<String, String> {
    let bid = body
        .get("USDBRL")
        .and_then(|quote| quote.get("bid"))
        .ok_or_else(|| "Exchange rate response is missing USDBRL.bid".to_string())?;

    match bid {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(format!("Unexpected bid value: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_bid() {
        let body = json!({"USDBRL": {"code": "USD", "codein": "BRL", "bid": "5.36874"}});
        assert_eq!(extract_bid(&body).unwrap(), "5.36874");
    }

    #[test]
    fn test_extract_bid_numeric() {
        let body = json!({"USDBRL": {"bid": 5.4}});
        assert_eq!(extract_bid(&body).unwrap(), "5.4");
    }

    #[test]
    fn test_extract_bid_missing() {
        let body = json!({"EURBRL": {"bid": "6.1"}});
        assert!(extract_bid(&body).unwrap_err().contains("USDBRL.bid"));
    }
}
