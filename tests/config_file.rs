use std::fs;
use tempfile::TempDir;
use toolcall::config::{normalize_endpoint, FileConfig};

#[test]
fn test_load_yaml_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join(".toolcall.yaml");
    fs::write(
        &config_path,
        r#"
api:
  endpoint: http://gpu-box:11434
  request_timeout: 120
model:
  default_model: qwen2.5
session:
  verbose: true
tools:
  max_rounds: 3
  exchange_rate:
    endpoint: http://quotes.local/last/USD-BRL
    timeout: 5
"#,
    )
    .unwrap();

    let config = FileConfig::load_from(&config_path).unwrap();
    assert_eq!(config.api.endpoint.as_deref(), Some("http://gpu-box:11434"));
    assert_eq!(config.api.request_timeout, Some(120));
    assert_eq!(config.model.default_model.as_deref(), Some("qwen2.5"));
    assert_eq!(config.session.verbose, Some(true));
    assert_eq!(config.tools.max_rounds, 3);
    assert_eq!(
        config.tools.exchange_rate.endpoint.as_deref(),
        Some("http://quotes.local/last/USD-BRL")
    );
    assert_eq!(config.tools.exchange_rate.timeout, Some(5));
}

#[test]
fn test_load_json_config_with_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join(".toolcall.json");
    fs::write(&config_path, r#"{"model": {"default_model": "llama3.1"}}"#).unwrap();

    let config = FileConfig::load_from(&config_path).unwrap();
    assert_eq!(config.model.default_model.as_deref(), Some("llama3.1"));
    assert_eq!(config.tools.max_rounds, 1);
    assert!(config.api.endpoint.is_none());
}

#[test]
fn test_invalid_config_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join(".toolcall.yaml");
    fs::write(&config_path, "tools: [not, a, map]").unwrap();

    let err = FileConfig::load_from(&config_path).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse YAML config file"));
}

#[test]
fn test_normalize_endpoint() {
    assert_eq!(
        normalize_endpoint("http://localhost:11434"),
        "http://localhost:11434/v1/chat/completions"
    );
    assert_eq!(
        normalize_endpoint("http://localhost:11434/"),
        "http://localhost:11434/v1/chat/completions"
    );
    assert_eq!(
        normalize_endpoint("http://localhost:11434/v1"),
        "http://localhost:11434/v1/chat/completions"
    );
    assert_eq!(
        normalize_endpoint("http://localhost:11434/v1/"),
        "http://localhost:11434/v1/chat/completions"
    );
    assert_eq!(
        normalize_endpoint("https://openrouter.ai/api/v1/chat/completions"),
        "https://openrouter.ai/api/v1/chat/completions"
    );
}
