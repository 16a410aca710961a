use std::time::Instant;

use opentelemetry::KeyValue;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::config::Config;
use crate::telemetry::metrics::{AGENT_CALL_DURATION, AGENT_CITATIONS, AGENT_ERROR_COUNT};

use super::{AgentResult, ResearchAgent, sse};

/// HTTP client for the remote agent research API. Regardless of the requested
/// mode the API responds with an SSE-shaped text body, so the full body is
/// buffered and handed to the stream ingestor.
pub struct AgentsApiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    agent: String,
    verbosity: String,
    max_workflow_steps: u32,
}

#[derive(Serialize)]
struct AgentRunRequest<'a> {
    agent: &'a str,
    input: &'a str,
    tools: Vec<Tool<'a>>,
    verbosity: &'a str,
    workflow_config: WorkflowConfig,
}

#[derive(Serialize)]
struct Tool<'a> {
    #[serde(rename = "type")]
    tool_type: &'a str,
}

#[derive(Serialize)]
struct WorkflowConfig {
    max_workflow_steps: u32,
}

impl AgentsApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.agent_api_url.clone(),
            api_key: config.agent_api_key.clone().unwrap_or_default(),
            agent: config.agent_name.clone(),
            verbosity: config.agent_verbosity.clone(),
            max_workflow_steps: config.agent_max_workflow_steps,
        }
    }

    async fn run(&self, input: &str) -> anyhow::Result<AgentResult> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| anyhow::anyhow!("invalid API key header: {e}"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let body = AgentRunRequest {
            agent: &self.agent,
            input,
            tools: vec![Tool { tool_type: "research" }],
            verbosity: &self.verbosity,
            workflow_config: WorkflowConfig {
                max_workflow_steps: self.max_workflow_steps,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Agents API {}: {}", status, error_body));
        }

        let raw = response.text().await?;
        Ok(sse::ingest(&raw))
    }
}

#[async_trait::async_trait]
impl ResearchAgent for AgentsApiClient {
    async fn research(&self, task: &str, input: &str) -> anyhow::Result<AgentResult> {
        let start = Instant::now();

        let span = tracing::info_span!(
            "agent.run",
            otel.name = %format!("agent.run {task}"),
            agent.task = %task,
            agent.name = %self.agent,
            agent.verbosity = %self.verbosity,
            agent.response.text_len = tracing::field::Empty,
            agent.response.citations = tracing::field::Empty,
            otel.status_code = tracing::field::Empty,
            error.type = tracing::field::Empty,
        );
        span.add_event(
            "agent.input",
            vec![KeyValue::new("agent.prompt", truncate(input, 1000))],
        );

        let result = self.run(input).instrument(span.clone()).await;

        let duration = start.elapsed().as_secs_f64();
        let task_kv = KeyValue::new("agent.task", task.to_string());

        match result {
            Ok(res) => {
                span.record("agent.response.text_len", res.text.len());
                span.record("agent.response.citations", res.citations.len());

                AGENT_CALL_DURATION.record(duration, &[task_kv.clone()]);
                AGENT_CITATIONS.record(res.citations.len() as f64, &[task_kv]);

                Ok(res)
            }
            Err(err) => {
                span.record("otel.status_code", "ERROR");
                span.record("error.type", classify_error(&err));

                AGENT_CALL_DURATION.record(duration, &[task_kv.clone()]);
                AGENT_ERROR_COUNT.add(1, &[task_kv]);

                Err(err)
            }
        }
    }

    fn name(&self) -> &str {
        &self.agent
    }
}

fn classify_error(err: &anyhow::Error) -> &'static str {
    let msg = err.to_string().to_lowercase();
    if msg.contains("rate limit") || msg.contains("429") {
        "rate_limit"
    } else if msg.contains("timeout") || msg.contains("timed out") || msg.contains("deadline") {
        "timeout"
    } else if msg.contains("401")
        || msg.contains("403")
        || msg.contains("auth")
        || msg.contains("api key")
    {
        "auth_error"
    } else if msg.contains("400") || msg.contains("422") || msg.contains("invalid") {
        "invalid_request"
    } else if msg.contains("500")
        || msg.contains("502")
        || msg.contains("503")
        || msg.contains("server")
    {
        "server_error"
    } else if msg.contains("connect")
        || msg.contains("dns")
        || msg.contains("network")
        || msg.contains("reset")
    {
        "network_error"
    } else {
        "unknown_error"
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        s.char_indices()
            .take_while(|&(i, c)| i + c.len_utf8() <= max)
            .map(|(_, c)| c)
            .collect()
    }
}
