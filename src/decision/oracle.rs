//! Decisions delegated to an external reasoning service
//!
//! Every call is bounded by a timeout and every reply is validated. Failures
//! surface as [`DecisionError`] so the scheduler can fall back.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::core::error::DecisionError;
use crate::decision::{Decision, DecisionProvider};
use crate::entity::agent::Agent;
use crate::llm::client::CompletionBackend;
use crate::llm::context::DecisionPrompt;
use crate::llm::parser::parse_decision;
use crate::simulation::perception::DecisionContext;

pub struct OracleProvider<B> {
    backend: B,
    timeout: Duration,
}

impl<B: CompletionBackend> OracleProvider<B> {
    pub fn new(backend: B, timeout: Duration) -> Self {
        Self { backend, timeout }
    }
}

#[async_trait]
impl<B: CompletionBackend> DecisionProvider for OracleProvider<B> {
    fn name(&self) -> &str {
        "oracle"
    }

    async fn decide(
        &self,
        agent: &Agent,
        context: &DecisionContext,
    ) -> Result<Option<Decision>, DecisionError> {
        let prompt = DecisionPrompt::new(agent, context);
        let payload = prompt
            .to_json()
            .map_err(|e| DecisionError::Unavailable(e.to_string()))?;

        let reply = tokio::time::timeout(
            self.timeout,
            self.backend.complete(&prompt.system_prompt(), &payload),
        )
        .await
        .map_err(|_| {
            warn!(agent = %agent.id, timeout = ?self.timeout, "oracle timed out");
            DecisionError::Timeout(self.timeout)
        })?
        .map_err(|e| DecisionError::Transport(e.to_string()))?;

        debug!(agent = %agent.id, bytes = reply.len(), "oracle replied");
        parse_decision(&reply).map(Some)
    }
}
