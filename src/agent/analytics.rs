//! Analytics agent.
//!
//! Answers statistical questions with terms, date-histogram, stats and
//! cardinality aggregations.

use async_trait::async_trait;

use super::config::AgentConfig;
use super::prompt::ANALYTICS_SYSTEM_PROMPT;
use super::router::AgentKind;
use super::tool::ToolSet;
use super::traits::Agent;

/// Agent that answers statistical questions with aggregations.
///
/// Has no document-level tools; every answer is derived from aggregation
/// results.
pub struct AnalyticsAgent {
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_tool_iterations: usize,
    tools: ToolSet,
}

impl AnalyticsAgent {
    /// Creates the agent with the model settings from `config`.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_tool_iterations: config.max_tool_iterations,
            tools: ToolSet::analytics_tools(),
        }
    }
}

#[async_trait]
impl Agent for AnalyticsAgent {
    fn name(&self) -> &'static str {
        "analytics"
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Analytics
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        ANALYTICS_SYSTEM_PROMPT
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
