use crate::config::Config;
use colored::*;
use jsonschema::{Draft, JSONSchema};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::{calculator, exchange_rate, ToolError};

#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub exchange_rate_endpoint: String,
    pub exchange_rate_timeout: Duration,
    pub verbose: bool,
}

impl ToolSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            exchange_rate_endpoint: config.exchange_rate_endpoint.clone(),
            exchange_rate_timeout: Duration::from_secs(config.exchange_rate_timeout),
            verbose: config.verbose,
        }
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            exchange_rate_endpoint: exchange_rate::DEFAULT_ENDPOINT.to_string(),
            exchange_rate_timeout: Duration::from_secs(crate::config::defaults::default_exchange_rate_timeout()),
            verbose: false,
        }
    }
}

pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = Result<String, String>> + Send + 'a>>;

pub type ToolHandler = Box<dyn for<'a> Fn(&'a Value, &'a ToolSettings) -> ToolFuture<'a> + Send + Sync>;

pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub handler: ToolHandler,
}

fn calculate_handler<'a>(args: &'a Value, _settings: &'a ToolSettings) -> ToolFuture<'a> {
    Box::pin(async move { calculator::handle_calculate(args) })
}

fn dollar_rate_handler<'a>(_args: &'a Value, settings: &'a ToolSettings) -> ToolFuture<'a> {
    Box::pin(exchange_rate::handle_get_dollar_rate(settings))
}

pub struct ToolRegistry {
    tools: HashMap<String, Tool>,
    settings: ToolSettings,
}

impl ToolRegistry {
    pub fn new(settings: ToolSettings) -> Self {
        Self {
            tools: HashMap::new(),
            settings,
        }
    }

    /// Registry holding `calculate` and `get_dollar_rate`.
    pub fn with_builtins(settings: ToolSettings) -> Self {
        let mut registry = Self::new(settings);
        registry.register_builtin_tools();
        registry
    }

    fn register_builtin_tools(&mut self) {
        self.register(Tool {
            name: "calculate".to_string(),
            description: "Use this tool to perform any mathematical operation. \
                You MUST use this tool whenever you need to add, subtract, multiply or divide numbers. \
                Do NOT calculate in your head - always use this tool. \
                Input: a math expression with numbers, + - * /, and parentheses only \
                (examples: '5.36 * 2', '100 + 50', '10 / 3'). \
                Returns the numeric result as a string."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "expression": {
                        "type": "string",
                        "description": "The arithmetic expression to evaluate"
                    }
                },
                "required": ["expression"],
                "additionalProperties": false
            }),
            handler: Box::new(calculate_handler),
        });

        self.register(Tool {
            name: "get_dollar_rate".to_string(),
            description: "Use this tool to get the current USD to BRL exchange rate. \
                Call this when the user asks about dollar price or exchange rate. \
                Takes no input. Returns the current rate as a decimal number (e.g. '5.36874')."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
            handler: Box::new(dollar_rate_handler),
        });
    }

    /// Add a tool. A tool already registered under the same name is replaced
    /// and returned.
    pub fn register(&mut self, tool: Tool) -> Option<Tool> {
        let previous = self.tools.insert(tool.name.clone(), tool);
        if let Some(ref replaced) = previous {
            if self.settings.verbose {
                eprintln!(
                    "{}",
                    format!("[tools] Tool '{}' registered twice; keeping the latest", replaced.name)
                        .yellow()
                );
            }
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    pub fn lookup(&self, name: &str) -> Result<&Tool, ToolError> {
        self.tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Registered tools ordered by name.
    pub fn list(&self) -> Vec<&Tool> {
        let mut tools: Vec<&Tool> = self.tools.values().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn names(&self) -> Vec<String> {
        self.list().iter().map(|t| t.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn validate_arguments(&self, tool_name: &str, arguments: &Value) -> Result<(), ToolError> {
        let tool = self.lookup(tool_name)?;

        let invalid = |reason: String| ToolError::InvalidArguments {
            tool: tool_name.to_string(),
            reason,
        };

        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&tool.input_schema)
            .map_err(|e| invalid(format!("invalid tool schema: {}", e)))?;

        if let Err(errors) = schema.validate(arguments) {
            let error_messages: Vec<String> = errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("{}: {}", path, e)
                    }
                })
                .collect();
            return Err(invalid(error_messages.join("; ")));
        }

        Ok(())
    }
}
