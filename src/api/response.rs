use crate::error::{Result, ToolcallError};
use crate::models::ToolCall;
use colored::*;
use serde_json::Value;
use uuid::Uuid;

use super::models::ModelResponse;

fn first_message(response_json: &Value) -> Result<&Value> {
    let choices = response_json
        .get("choices")
        .and_then(|c| c.as_array())
        .ok_or_else(|| ToolcallError::Other("No choices in response".to_string()))?;

    let first_choice = choices
        .first()
        .ok_or_else(|| ToolcallError::Other("Empty choices array".to_string()))?;

    first_choice
        .get("message")
        .ok_or_else(|| ToolcallError::Other("No message in response".to_string()))
}

/// Raw tool calls of a chat-completions response, if any were requested.
pub fn parse_tool_calls(response_json: &Value) -> Result<Option<Vec<Value>>> {
    let message = first_message(response_json)?;

    if let Some(tool_calls) = message.get("tool_calls").and_then(|tc| tc.as_array()) {
        if !tool_calls.is_empty() {
            return Ok(Some(tool_calls.clone()));
        }
    }

    Ok(None)
}

/// Text content of a chat-completions response.
pub fn extract_content(response_json: &Value) -> Result<Option<String>> {
    let message = first_message(response_json)?;

    Ok(message
        .get("content")
        .and_then(|c| c.as_str())
        .map(|s| s.to_string()))
}

/// Convert one raw tool call into the typed form. Returns `None` when the
/// call names no function, since nothing could be dispatched for it.
pub fn typed_tool_call(raw: &Value) -> Option<ToolCall> {
    let function = raw.get("function")?;
    let name = function.get("name").and_then(|n| n.as_str())?;

    // Some servers send arguments as an object rather than a JSON string.
    let arguments = match function.get("arguments") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "{}".to_string(),
        Some(other) => other.to_string(),
    };

    let id = raw
        .get("id")
        .and_then(|i| i.as_str())
        .filter(|i| !i.is_empty())
        .map(|i| i.to_string())
        .unwrap_or_else(|| format!("call_{}", Uuid::new_v4().simple()));

    Some(ToolCall::function(id, name, arguments))
}

pub fn parse_model_response(response_json: &Value) -> Result<ModelResponse> {
    let content = extract_content(response_json)?.unwrap_or_default();

    let tool_calls = parse_tool_calls(response_json)?
        .unwrap_or_default()
        .iter()
        .filter_map(|raw| {
            let call = typed_tool_call(raw);
            if call.is_none() {
                eprintln!(
                    "{}",
                    "Warning: Tool call without a function name, skipping".yellow()
                );
            }
            call
        })
        .collect();

    Ok(ModelResponse::with_tool_calls(content, tool_calls))
}
