//! Index-management agent.

use async_trait::async_trait;

use super::config::AgentConfig;
use super::prompt::INDEX_SYSTEM_PROMPT;
use super::router::AgentKind;
use super::tool::ToolSet;
use super::traits::Agent;

/// Agent that creates and deletes indices and writes documents.
pub struct IndexAgent {
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_tool_iterations: usize,
    tools: ToolSet,
}

impl IndexAgent {
    /// Creates the agent with the model settings from `config`.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_tool_iterations: config.max_tool_iterations,
            tools: ToolSet::index_tools(),
        }
    }
}

#[async_trait]
impl Agent for IndexAgent {
    fn name(&self) -> &'static str {
        "index_management"
    }

    fn kind(&self) -> AgentKind {
        AgentKind::IndexManagement
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        INDEX_SYSTEM_PROMPT
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

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::{MockBackend, ScriptedProvider, Step};

    #[test]
    fn test_index_agent_tools() {
        let config = AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        let agent = IndexAgent::new(&config);
        assert_eq!(agent.name(), "index_management");
        assert_eq!(agent.kind(), AgentKind::IndexManagement);
        assert_eq!(agent.tools().len(), 7);
        for name in [
            "create_index",
            "delete_index",
            "index_document",
            "bulk_index_documents",
            "update_document",
            "delete_document",
            "list_indices",
        ] {
            assert!(agent.tools().contains(name), "missing {name}");
        }
        assert!(!agent.tools().contains("search_documents"));
    }

    #[tokio::test]
    async fn test_create_index_sanitizes_name() {
        let config = AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        let backend = MockBackend::default();
        let provider = ScriptedProvider::new(vec![
            Step::Tools(vec![("create_index", json!({"index": "My Products"}))]),
            Step::Text("Created index my_products."),
        ]);

        let response = IndexAgent::new(&config)
            .execute(&provider, &backend, "create index My Products")
            .await;

        assert_eq!(response.rounds, 2);
        let calls = backend.calls();
        assert_eq!(calls[0].operation, "create_index");
        assert_eq!(calls[0].index, "my_products");
    }
}
