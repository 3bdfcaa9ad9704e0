//! Search agent.
//!
//! Turns natural-language lookups into query DSL and runs them through
//! `search_documents`, with index discovery via `list_indices` and
//! `get_index_info`.

use async_trait::async_trait;

use super::config::AgentConfig;
use super::prompt::SEARCH_SYSTEM_PROMPT;
use super::router::AgentKind;
use super::tool::ToolSet;
use super::traits::Agent;

/// Agent that answers search requests.
pub struct SearchAgent {
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_tool_iterations: usize,
    tools: ToolSet,
}

impl SearchAgent {
    /// Creates the agent with the model settings from `config`.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_tool_iterations: config.max_tool_iterations,
            tools: ToolSet::search_tools(),
        }
    }
}

#[async_trait]
impl Agent for SearchAgent {
    fn name(&self) -> &'static str {
        "search"
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Search
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        SEARCH_SYSTEM_PROMPT
    }

    fn tools(&self) -> &ToolSet {
        &self.tools
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    fn max_tool_iterations(&self) -> usize {
        self.max_tool_iterations
    }
}
