pub mod calculator;
pub mod exchange_rate;
mod registry;

pub use registry::{Tool, ToolFuture, ToolHandler, ToolRegistry, ToolSettings};

use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error("Tool '{0}' is not available")]
    UnknownTool(String),
    #[error("Invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },
    #[error("{0}")]
    Execution(String),
}

/// Tool descriptors in the OpenAI `tools` request shape.
pub fn format_tools_for_llm(registry: &ToolRegistry) -> Vec<Value> {
    registry
        .list()
        .iter()
        .map(|tool| {
            json!({
                "type": "function",
                "function": {
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.input_schema,
                }
            })
        })
        .collect()
}

pub async fn call_tool(
    registry: &ToolRegistry,
    tool_name: &str,
    arguments: &Value,
) -> Result<String, ToolError> {
    let tool = registry.lookup(tool_name)?;
    registry.validate_arguments(tool_name, arguments)?;

    (tool.handler)(arguments, registry.settings())
        .await
        .map_err(ToolError::Execution)
}

/// Decode the argument string a model attached to a tool call. Blank or
/// `null` arguments mean "no arguments".
pub fn parse_arguments(raw: &str) -> Result<Value, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(json!({}));
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Null) => Ok(json!({})),
        Ok(value) => Ok(value),
        Err(e) => Err(format!("failed to parse arguments: {}", e)),
    }
}
