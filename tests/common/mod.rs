#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use toolcall::api::{ChatModel, ModelResponse};
use toolcall::controller::AppContext;
use toolcall::error::{Result, ToolcallError};
use toolcall::models::{Message, ToolCall};
use toolcall::observability::Langfuse;
use toolcall::tools::{ToolRegistry, ToolSettings};

/// Requests seen by a [`ScriptedModel`]: the messages and the number of
/// tool descriptors offered on each call.
pub type RequestLog = Arc<Mutex<Vec<(Vec<Message>, usize)>>>;

/// Chat model that replays canned replies in order.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ModelResponse>>>,
    requests: RequestLog,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<ModelResponse>>) -> (Self, RequestLog) {
        let requests: RequestLog = Arc::new(Mutex::new(Vec::new()));
        let model = Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: requests.clone(),
        };
        (model, requests)
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, messages: &[Message], tools: &[Value]) -> Result<ModelResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((messages.to_vec(), tools.len()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ToolcallError::Other("script exhausted".to_string())))
    }
}

pub fn calc_call(id: &str, expression: &str) -> ToolCall {
    ToolCall::function(
        id,
        "calculate",
        serde_json::json!({ "expression": expression }).to_string(),
    )
}

pub fn context(model: ScriptedModel, max_tool_rounds: u32) -> AppContext {
    context_with(model, max_tool_rounds, Langfuse::disabled(), ToolRegistry::with_builtins(ToolSettings::default()))
}

pub fn context_with(
    model: ScriptedModel,
    max_tool_rounds: u32,
    langfuse: Langfuse,
    registry: ToolRegistry,
) -> AppContext {
    AppContext {
        model: Box::new(model),
        registry,
        langfuse,
        max_tool_rounds,
        system_prompt: None,
        verbose: false,
    }
}
