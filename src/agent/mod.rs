pub mod client;
pub mod sse;

pub use client::AgentsApiClient;

use serde::{Deserialize, Serialize};

/// One source reference surfaced by the agent, in stream appearance order.
/// Deduplication is not guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// The reduced form of one agent run: stitched text deltas plus every
/// citation that appeared in the stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub text: String,
    pub citations: Vec<Citation>,
}

#[async_trait::async_trait]
pub trait ResearchAgent: Send + Sync {
    /// Runs one research task against the agent API. `task` is a short label
    /// used only for spans and metrics.
    async fn research(&self, task: &str, input: &str) -> anyhow::Result<AgentResult>;

    fn name(&self) -> &str;
}
