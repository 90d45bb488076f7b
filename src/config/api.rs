use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub request_timeout: Option<u64>,
}

/// Turn a host or base URL into a full chat-completions URL.
pub fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.ends_with("/chat/completions") {
        endpoint.to_string()
    } else if endpoint.ends_with("/v1") {
        format!("{}/chat/completions", endpoint)
    } else if endpoint.ends_with("/v1/") {
        format!("{}chat/completions", endpoint)
    } else {
        format!("{}/v1/chat/completions", endpoint.trim_end_matches('/'))
    }
}
