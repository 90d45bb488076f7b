use crate::api::{parse_model_response, ModelResponse, RequestBody};
use crate::config::Config;
use crate::error::{Result, ToolcallError};
use crate::models::Message;
use async_trait::async_trait;
use colored::*;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;

/// A chat model that can be offered tools.
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn model_name(&self) -> &str;

    async fn complete(&self, messages: &[Message], tools: &[Value]) -> Result<ModelResponse>;
}

/// Chat model behind an OpenAI-compatible `/chat/completions` endpoint,
/// such as Ollama's.
pub struct OpenAiCompatModel {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    verbose: bool,
}

impl OpenAiCompatModel {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<&str>,
        request_timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e| {
                    ToolcallError::ConfigError(format!("Invalid authorization header: {}", e))
                })?,
            );
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
            model: model.into(),
            verbose: false,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut model = Self::new(
            config.api_endpoint.clone(),
            config.model.clone(),
            config.api_key.as_deref(),
            config.request_timeout.map(Duration::from_secs),
        )?;
        model.verbose = config.verbose;
        Ok(model)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatModel {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[Message], tools: &[Value]) -> Result<ModelResponse> {
        let request_body = RequestBody {
            model: self.model.clone(),
            messages: messages.to_vec(),
            stream: false,
            tools: if tools.is_empty() {
                None
            } else {
                Some(tools.to_vec())
            },
        };

        if self.verbose {
            eprintln!(
                "{}",
                format!(
                    "[AI] POST {} (model={}, messages={}, tools={})",
                    self.endpoint,
                    self.model,
                    messages.len(),
                    tools.len()
                )
                .dimmed()
            );
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request_body)
            .send()
            .await?;

        if self.verbose {
            eprintln!(
                "{}",
                format!("[AI] Response status: {}", response.status()).dimmed()
            );
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ToolcallError::ApiError {
                status,
                message: error_text,
            });
        }

        let response_text = response.text().await?;
        if self.verbose {
            eprintln!("{}", format!("[AI] Raw response: {}", response_text).dimmed());
        }

        let response_json: Value = serde_json::from_str(&response_text)?;
        parse_model_response(&response_json)
    }
}
