pub const DEFAULT_API_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2";
pub const DEFAULT_LANGFUSE_HOST: &str = "https://cloud.langfuse.com";

pub fn default_max_tool_rounds() -> u32 {
    1 // A single tool round, then the model must answer
}

pub fn default_exchange_rate_endpoint() -> String {
    crate::tools::exchange_rate::DEFAULT_ENDPOINT.to_string()
}

pub fn default_exchange_rate_timeout() -> u64 {
    20
}

pub fn is_default_max_tool_rounds(value: &u32) -> bool {
    *value == default_max_tool_rounds()
}
