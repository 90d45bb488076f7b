//! One question, at most `max_tool_rounds` rounds of tool calls, one answer.
//!
//! ```text
//! Initial --(no tool calls)--> Done
//! Initial --(tool calls)-----> ToolsPending --(follow-up reply)--> Done
//!                               ^        |
//!                               +--------+ (more tool calls, rounds left)
//! ```

use crate::api::{ChatModel, ModelResponse, OpenAiCompatModel};
use crate::config::Config;
use crate::error::Result;
use crate::models::{Message, ToolCall};
use crate::observability::{Langfuse, TraceHandle};
use crate::tools::{call_tool, format_tools_for_llm, parse_arguments, ToolRegistry, ToolSettings};
use crate::ui::{display_tool_call, display_tool_error};
use colored::*;
use serde_json::{json, Value};

pub const TRACE_NAME: &str = "tool-calling";

const DEFAULT_PREAMBLE: &str = "In the response assign the response with : Powered By Ollama and Jefferson. \
You are a helpful assistant that can use tools to answer user questions. \
Use the provided tools whenever necessary to get accurate information.";

/// Everything a run needs, built once at startup.
pub struct AppContext {
    pub model: Box<dyn ChatModel>,
    pub registry: ToolRegistry,
    pub langfuse: Langfuse,
    pub max_tool_rounds: u32,
    pub system_prompt: Option<String>,
    pub verbose: bool,
}

impl AppContext {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            model: Box::new(OpenAiCompatModel::from_config(config)?),
            registry: ToolRegistry::with_builtins(ToolSettings::from_config(config)),
            langfuse: Langfuse::new(config.langfuse.clone(), config.verbose),
            max_tool_rounds: config.max_tool_rounds,
            system_prompt: config.system_prompt.clone(),
            verbose: config.verbose,
        })
    }
}

#[derive(Debug)]
pub struct RoundTripOutcome {
    pub answer: String,
    /// Names of every tool the model asked for, in request order.
    pub tools_used: Vec<String>,
    pub transcript: Vec<Message>,
    pub tool_rounds: u32,
    pub trace: TraceHandle,
}

enum RoundState {
    Initial,
    ToolsPending(ModelResponse),
    Done(String),
}

pub fn build_system_prompt(registry: &ToolRegistry, preamble: Option<&str>) -> String {
    let tool_lines: Vec<String> = registry
        .list()
        .iter()
        .map(|tool| format!("- {}: {}", tool.name, tool.description))
        .collect();

    format!(
        "{} You have access to the following tools:\n{}",
        preamble.unwrap_or(DEFAULT_PREAMBLE),
        tool_lines.join("\n")
    )
}

pub fn termination_message(rounds: u32) -> String {
    format!(
        "Stopped after {} tool round(s) without a final answer.",
        rounds
    )
}

fn tool_calls_summary(tool_calls: &[ToolCall]) -> Value {
    Value::Array(
        tool_calls
            .iter()
            .map(|call| {
                json!({
                    "name": call.name(),
                    "args": parse_arguments(&call.function.arguments)
                        .unwrap_or_else(|_| Value::String(call.function.arguments.clone())),
                    "id": call.id,
                })
            })
            .collect(),
    )
}

async fn call_model(
    ctx: &AppContext,
    trace: &TraceHandle,
    generation_name: &str,
    messages: &[Message],
    tools: &[Value],
) -> Result<ModelResponse> {
    let input = serde_json::to_value(messages).unwrap_or(Value::Null);
    let generation = ctx
        .langfuse
        .generation(trace, generation_name, ctx.model.model_name(), input);

    match ctx.model.complete(messages, tools).await {
        Ok(response) => {
            let output = if response.has_tool_calls() {
                tool_calls_summary(&response.tool_calls)
            } else {
                Value::String(response.content.clone())
            };
            ctx.langfuse.end_generation(&generation, output);
            Ok(response)
        }
        Err(e) => {
            ctx.langfuse
                .end_generation(&generation, json!({ "error": e.to_string() }));
            ctx.langfuse
                .update_trace(trace, json!({ "error": e.to_string() }));
            Err(e)
        }
    }
}

/// Run one requested tool call and produce the text that goes back to the
/// model. Failures become `Error: ` strings; this never fails the run.
async fn execute_tool_call(ctx: &AppContext, trace: &TraceHandle, call: &ToolCall) -> String {
    let name = call.name();

    let arguments = match parse_arguments(&call.function.arguments) {
        Ok(arguments) => arguments,
        Err(e) => {
            let raw = Value::String(call.function.arguments.clone());
            display_tool_call(name, &raw);
            let span = ctx.langfuse.span(trace, &format!("tool:{}", name), raw);
            let error_text = format!("Error: {} for tool '{}'", e, name);
            display_tool_error(name, &error_text);
            ctx.langfuse.end_span(&span, Value::String(error_text.clone()));
            return error_text;
        }
    };

    display_tool_call(name, &arguments);
    let span = ctx
        .langfuse
        .span(trace, &format!("tool:{}", name), arguments.clone());

    let result = match call_tool(&ctx.registry, name, &arguments).await {
        Ok(result_text) => result_text,
        Err(e) => {
            let error_text = format!("Error: {}", e);
            display_tool_error(name, &error_text);
            error_text
        }
    };

    if ctx.verbose {
        eprintln!(
            "{}",
            format!("[tools] {} ({}) -> {}", name, call.id, result).dimmed()
        );
    }

    ctx.langfuse.end_span(&span, Value::String(result.clone()));
    result
}

pub async fn run(ctx: &AppContext, question: &str) -> Result<RoundTripOutcome> {
    let trace = ctx.langfuse.trace(TRACE_NAME, Value::String(question.to_string()));
    let tools = format_tools_for_llm(&ctx.registry);

    if ctx.verbose {
        eprintln!(
            "{}",
            format!(
                "[tools] Available tools: {}",
                ctx.registry.names().join(", ")
            )
            .dimmed()
        );
    }

    let mut messages = vec![
        Message::system(build_system_prompt(
            &ctx.registry,
            ctx.system_prompt.as_deref(),
        )),
        Message::user(question),
    ];
    let mut tools_used = Vec::new();
    let mut rounds = 0u32;
    let mut state = RoundState::Initial;

    let answer = loop {
        state = match state {
            RoundState::Initial => {
                let response = call_model(ctx, &trace, "llm-first-call", &messages, &tools).await?;
                if response.has_tool_calls() {
                    RoundState::ToolsPending(response)
                } else {
                    RoundState::Done(response.content)
                }
            }
            RoundState::ToolsPending(response) => {
                rounds += 1;
                if ctx.verbose {
                    eprintln!(
                        "{}",
                        format!(
                            "[AI] Tool round {}: {} call(s)",
                            rounds,
                            response.tool_calls.len()
                        )
                        .dimmed()
                    );
                }

                let ModelResponse {
                    content,
                    tool_calls,
                } = response;

                let mut results = Vec::with_capacity(tool_calls.len());
                for call in &tool_calls {
                    let result = execute_tool_call(ctx, &trace, call).await;
                    tools_used.push(call.name().to_string());
                    results.push(Message::tool_result(call.id.clone(), result));
                }

                messages.push(Message::assistant(content, tool_calls));
                messages.extend(results);

                let generation_name = if rounds >= ctx.max_tool_rounds {
                    "llm-final-call".to_string()
                } else {
                    format!("llm-call-{}", rounds + 1)
                };
                let followup = call_model(ctx, &trace, &generation_name, &messages, &tools).await?;

                if !followup.has_tool_calls() {
                    RoundState::Done(followup.content)
                } else if rounds < ctx.max_tool_rounds {
                    RoundState::ToolsPending(followup)
                } else {
                    if ctx.verbose {
                        eprintln!(
                            "{}",
                            format!(
                                "[AI] Model requested {} more tool call(s) after the last allowed round; not running them",
                                followup.tool_calls.len()
                            )
                            .yellow()
                        );
                    }
                    if followup.content.trim().is_empty() {
                        RoundState::Done(termination_message(rounds))
                    } else {
                        RoundState::Done(followup.content)
                    }
                }
            }
            RoundState::Done(answer) => break answer,
        };
    };

    ctx.langfuse
        .update_trace(&trace, Value::String(answer.clone()));

    Ok(RoundTripOutcome {
        answer,
        tools_used,
        transcript: messages,
        tool_rounds: rounds,
        trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_lists_tools() {
        let registry = ToolRegistry::with_builtins(ToolSettings::default());
        let prompt = build_system_prompt(&registry, None);
        assert!(prompt.starts_with("In the response assign the response with : Powered By Ollama and Jefferson."));
        assert!(prompt.contains("\n- calculate: "));
        assert!(prompt.contains("\n- get_dollar_rate: "));
    }

    #[test]
    fn test_system_prompt_override_keeps_tool_list() {
        let registry = ToolRegistry::with_builtins(ToolSettings::default());
        let prompt = build_system_prompt(&registry, Some("Be brief."));
        assert!(prompt.starts_with("Be brief. You have access to the following tools:"));
        assert!(prompt.contains("- calculate: "));
    }
}
