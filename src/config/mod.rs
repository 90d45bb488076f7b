mod api;
pub mod defaults;
mod langfuse;
mod tools;

use crate::cli::Args;
use crate::error::{Result, ToolcallError};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use api::{normalize_endpoint, ApiConfig};
pub use langfuse::LangfuseConfig;
pub use tools::{ExchangeRateConfig, ToolsConfig};

use defaults::{
    default_exchange_rate_endpoint, default_exchange_rate_timeout, DEFAULT_API_ENDPOINT,
    DEFAULT_MODEL,
};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub default_model: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_endpoint: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub request_timeout: Option<u64>,
    pub max_tool_rounds: u32,
    pub exchange_rate_endpoint: String,
    pub exchange_rate_timeout: u64,
    pub verbose: bool,
    pub langfuse: Option<LangfuseConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self> {
        let file_config = match FileConfig::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {:#}; using defaults", e);
                FileConfig::default()
            }
        };

        Self::resolve(args, &file_config, |key| env::var(key).ok())
    }

    /// Merge the sources: CLI args > environment > config file > defaults.
    pub fn resolve<F>(args: &Args, file_config: &FileConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("AI_API_KEY").filter(|k| !k.is_empty());

        let api_endpoint = args
            .api_endpoint
            .clone()
            .or_else(|| lookup("AI_API_ENDPOINT"))
            .or_else(|| lookup("OLLAMA_HOST"))
            .or(file_config.api.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string());
        let api_endpoint = normalize_endpoint(&with_scheme(&api_endpoint));

        let model = args
            .model
            .clone()
            .or_else(|| lookup("AI_MODEL"))
            .or(file_config.model.default_model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let system_prompt = lookup("AI_SYSTEM_PROMPT").or(file_config.model.system_prompt.clone());

        let request_timeout = lookup("AI_REQUEST_TIMEOUT")
            .and_then(|s| s.parse::<u64>().ok())
            .or(file_config.api.request_timeout);

        let max_tool_rounds = args
            .max_rounds
            .or_else(|| lookup("AI_MAX_TOOL_ROUNDS").and_then(|s| s.parse::<u32>().ok()))
            .unwrap_or(file_config.tools.max_rounds);
        if max_tool_rounds == 0 {
            return Err(ToolcallError::ConfigError(
                "max tool rounds must be at least 1".to_string(),
            ));
        }

        let exchange_rate_endpoint = lookup("EXCHANGE_RATE_ENDPOINT")
            .or(file_config.tools.exchange_rate.endpoint.clone())
            .unwrap_or_else(default_exchange_rate_endpoint);

        let exchange_rate_timeout = lookup("EXCHANGE_RATE_TIMEOUT")
            .and_then(|s| s.parse::<u64>().ok())
            .or(file_config.tools.exchange_rate.timeout)
            .unwrap_or_else(default_exchange_rate_timeout);

        let verbose = args.verbose
            || lookup("AI_VERBOSE")
                .map(|v| parse_flag(&v))
                .or(file_config.session.verbose)
                .unwrap_or(false);

        let langfuse = if args.no_trace {
            None
        } else {
            LangfuseConfig::from_lookup(&lookup)
        };

        Ok(Config {
            api_key,
            api_endpoint,
            model,
            system_prompt,
            request_timeout,
            max_tool_rounds,
            exchange_rate_endpoint,
            exchange_rate_timeout,
            verbose,
            langfuse,
        })
    }
}

/// `OLLAMA_HOST` is commonly set as a bare `host:port`.
fn with_scheme(endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{}", endpoint)
    }
}

impl FileConfig {
    pub fn load() -> anyhow::Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        Ok(FileConfig::default())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );

        let config = if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))?
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))?
        };

        Ok(config)
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".toolcall.yaml"),
            PathBuf::from(".toolcall.yml"),
            PathBuf::from(".toolcall.json"),
        ];

        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("toolcall");
            paths.push(config_dir.join("toolcall.yaml"));
            paths.push(config_dir.join("toolcall.yml"));
            paths.push(config_dir.join("toolcall.json"));
        }

        paths
    }
}
