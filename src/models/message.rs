use serde::{Deserialize, Serialize};

use super::tool::ToolCall;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    /// Assistant turn as returned by the model. Empty content is dropped so
    /// the wire shape matches what chat endpoints send for pure tool calls.
    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        let content = content.into();
        Self {
            role: Role::Assistant,
            content: if content.is_empty() { None } else { Some(content) },
            tool_calls: if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls)
            },
            tool_call_id: None,
        }
    }

    /// Result of one tool invocation, correlated to the request by id.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_result_wire_shape() {
        let msg = Message::tool_result("call_1", "1071");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"role": "tool", "content": "1071", "tool_call_id": "call_1"})
        );
    }

    #[test]
    fn test_assistant_without_content_omits_field() {
        let msg = Message::assistant("", vec![ToolCall::function("call_1", "calculate", "{}")]);
        let value = serde_json::to_value(&msg).unwrap();
        assert!(value.get("content").is_none());
        assert_eq!(value["tool_calls"][0]["function"]["name"], "calculate");
    }
}
