//! Agent trait definition.
//!
//! The search, index-management and analytics agents all implement this
//! trait, which gives the [`AgentSystem`](super::system::AgentSystem) a
//! uniform way to run whichever agent the router picked.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info};

use super::agentic_loop::{LoopOutcome, agentic_loop};
use super::executor::ToolExecutor;
use super::message::{ChatRequest, TokenUsage, Transcript};
use super::provider::LlmProvider;
use super::router::AgentKind;
use super::tool::ToolSet;
use crate::backend::SearchBackend;

/// Answer returned when the round limit is hit before a final reply.
pub const EXHAUSTED_MESSAGE: &str =
    "I've reached the maximum number of steps. The task may be too complex or require clarification.";

/// How an agent execution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// The model produced a final answer.
    Final,
    /// The round limit was reached.
    Exhausted,
    /// The completion service failed.
    Failed,
}

impl AgentStatus {
    /// Lowercase label used in CLI output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Final => "final",
            Self::Exhausted => "exhausted",
            Self::Failed => "failed",
        }
    }
}

/// Response from an agent execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentResponse {
    /// User-facing answer text.
    pub content: String,
    /// How the execution ended.
    pub status: AgentStatus,
    /// Completion requests made.
    pub rounds: usize,
    /// Token usage summed over every round.
    pub usage: TokenUsage,
}

impl AgentResponse {
    fn from_outcome(outcome: LoopOutcome) -> Self {
        match outcome {
            LoopOutcome::Final {
                content,
                rounds,
                usage,
            } => Self {
                content,
                status: AgentStatus::Final,
                rounds,
                usage,
            },
            LoopOutcome::Exhausted { rounds, usage } => Self {
                content: EXHAUSTED_MESSAGE.to_string(),
                status: AgentStatus::Exhausted,
                rounds,
                usage,
            },
        }
    }
}

/// Trait implemented by all agents in the system.
///
/// An agent is a fixed system prompt plus a tool catalogue and sampling
/// settings. [`Agent::execute`] seeds a transcript with the prompt and the
/// user query and runs the tool-calling loop against a backend.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent name for logging and identification.
    fn name(&self) -> &'static str;

    /// Which routing target this agent serves.
    fn kind(&self) -> AgentKind;

    /// Model identifier to use for this agent.
    fn model(&self) -> &str;

    /// System prompt that defines the agent's role and behavior.
    fn system_prompt(&self) -> &str;

    /// Tools this agent may call.
    fn tools(&self) -> &ToolSet;

    /// Sampling temperature.
    fn temperature(&self) -> f32 {
        0.7
    }

    /// Maximum tokens for each completion.
    fn max_tokens(&self) -> u32 {
        2000
    }

    /// Maximum completion rounds per execution.
    fn max_tool_iterations(&self) -> usize {
        5
    }

    /// Runs the agent on a user query.
    ///
    /// Never fails: a completion-service error is reported as an
    /// [`AgentStatus::Failed`] response whose content describes the error.
    async fn execute(
        &self,
        provider: &dyn LlmProvider,
        backend: &dyn SearchBackend,
        query: &str,
    ) -> AgentResponse {
        info!(agent = self.name(), model = self.model(), "agent started");

        let mut request = ChatRequest {
            model: self.model().to_string(),
            messages: Transcript::new(self.system_prompt(), query),
            temperature: Some(self.temperature()),
            max_tokens: Some(self.max_tokens()),
            tools: self.tools().definitions().to_vec(),
        };
        let executor = ToolExecutor::new(backend, self.tools());

        let response = match agentic_loop(
            provider,
            &mut request,
            &executor,
            self.max_tool_iterations(),
        )
        .await
        {
            Ok(outcome) => AgentResponse::from_outcome(outcome),
            Err(e) => {
                error!(agent = self.name(), error = %e, "agent execution failed");
                AgentResponse {
                    content: format!("I encountered an error: {e}"),
                    status: AgentStatus::Failed,
                    rounds: 0,
                    usage: TokenUsage::default(),
                }
            }
        };

        info!(
            agent = self.name(),
            status = response.status.as_str(),
            rounds = response.rounds,
            total_tokens = response.usage.total_tokens,
            "agent finished"
        );
        response
    }
}
