use serde::{Deserialize, Serialize};

use super::defaults::{default_max_tool_rounds, is_default_max_tool_rounds};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default = "default_max_tool_rounds")]
    #[serde(skip_serializing_if = "is_default_max_tool_rounds")]
    pub max_rounds: u32,
    #[serde(default)]
    pub exchange_rate: ExchangeRateConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_tool_rounds(),
            exchange_rate: ExchangeRateConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExchangeRateConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
}
