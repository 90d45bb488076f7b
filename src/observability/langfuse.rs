//! Best-effort client for the Langfuse ingestion API.
//!
//! Events are buffered in memory as they happen and sent in one batch by
//! [`Langfuse::flush`]. Nothing here returns an error to the caller: a
//! broken or unreachable backend costs a warning on stderr, never the
//! answer.

use crate::config::LangfuseConfig;
use chrono::{SecondsFormat, Utc};
use colored::*;
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

const INGESTION_PATH: &str = "/api/public/ingestion";
const FLUSH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct TraceHandle {
    pub id: String,
}

/// A generation or span that has been started and still needs ending.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub id: String,
    pub trace_id: String,
}

pub struct Langfuse {
    http: reqwest::Client,
    config: Option<LangfuseConfig>,
    events: Mutex<Vec<Value>>,
    verbose: bool,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Langfuse {
    pub fn new(config: Option<LangfuseConfig>, verbose: bool) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(FLUSH_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            config,
            events: Mutex::new(Vec::new()),
            verbose,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, false)
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    fn record(&self, event_type: &str, body: Value) {
        if !self.is_enabled() {
            return;
        }
        let event = json!({
            "id": new_id(),
            "timestamp": now(),
            "type": event_type,
            "body": body,
        });
        // A poisoned buffer only loses this event.
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    pub fn trace(&self, name: &str, input: Value) -> TraceHandle {
        let id = new_id();
        self.record(
            "trace-create",
            json!({
                "id": id,
                "name": name,
                "input": input,
                "timestamp": now(),
            }),
        );
        TraceHandle { id }
    }

    /// Langfuse upserts traces by id, so an update is another create.
    pub fn update_trace(&self, trace: &TraceHandle, output: Value) {
        self.record(
            "trace-create",
            json!({
                "id": trace.id,
                "output": output,
            }),
        );
    }

    pub fn generation(&self, trace: &TraceHandle, name: &str, model: &str, input: Value) -> Observation {
        let id = new_id();
        self.record(
            "generation-create",
            json!({
                "id": id,
                "traceId": trace.id,
                "name": name,
                "model": model,
                "input": input,
                "startTime": now(),
            }),
        );
        Observation {
            id,
            trace_id: trace.id.clone(),
        }
    }

    pub fn end_generation(&self, generation: &Observation, output: Value) {
        self.record(
            "generation-update",
            json!({
                "id": generation.id,
                "traceId": generation.trace_id,
                "output": output,
                "endTime": now(),
            }),
        );
    }

    pub fn span(&self, trace: &TraceHandle, name: &str, input: Value) -> Observation {
        let id = new_id();
        self.record(
            "span-create",
            json!({
                "id": id,
                "traceId": trace.id,
                "name": name,
                "input": input,
                "startTime": now(),
            }),
        );
        Observation {
            id,
            trace_id: trace.id.clone(),
        }
    }

    pub fn end_span(&self, span: &Observation, output: Value) {
        self.record(
            "span-update",
            json!({
                "id": span.id,
                "traceId": span.trace_id,
                "output": output,
                "endTime": now(),
            }),
        );
    }

    /// Number of buffered events not yet sent.
    pub fn pending(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Send everything buffered so far. Returns how many events the backend
    /// accepted the batch for; failures are logged and the events dropped.
    pub async fn flush(&self) -> usize {
        let Some(ref config) = self.config else {
            return 0;
        };

        let batch = match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(_) => return 0,
        };
        if batch.is_empty() {
            return 0;
        }
        let count = batch.len();

        let url = format!("{}{}", config.host, INGESTION_PATH);
        if self.verbose {
            eprintln!(
                "{}",
                format!("[trace] Sending {} event(s) to {}", count, url).dimmed()
            );
        }

        let result = self
            .http
            .post(&url)
            .basic_auth(&config.public_key, Some(&config.secret_key))
            .json(&json!({ "batch": batch }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                // 207 responses list per-event failures.
                if let Ok(body) = response.json::<Value>().await {
                    let errors = body
                        .get("errors")
                        .and_then(|e| e.as_array())
                        .map(|e| e.len())
                        .unwrap_or(0);
                    if errors > 0 {
                        eprintln!(
                            "{}",
                            format!("Warning: Langfuse rejected {} of {} trace event(s)", errors, count)
                                .yellow()
                        );
                        return count - errors.min(count);
                    }
                }
                count
            }
            Ok(response) => {
                eprintln!(
                    "{}",
                    format!(
                        "Warning: Langfuse ingestion failed with status {}",
                        response.status().as_u16()
                    )
                    .yellow()
                );
                0
            }
            Err(e) => {
                eprintln!(
                    "{}",
                    format!("Warning: Failed to send traces to Langfuse: {}", e).yellow()
                );
                0
            }
        }
    }

    pub fn trace_url(&self, trace: &TraceHandle) -> Option<String> {
        self.config
            .as_ref()
            .map(|config| format!("{}/trace/{}", config.host, trace.id))
    }
}
