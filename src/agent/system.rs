//! Top-level wiring of router, agents, provider and backend.
//!
//! ```text
//! query → route()
//!   ├── IndexManagement → IndexAgent
//!   ├── Analytics       → AnalyticsAgent
//!   └── Search          → SearchAgent
//!         └── agentic_loop (provider ⇄ ToolExecutor ⇄ backend)
//! ```

use std::sync::Arc;

use tracing::info;

use super::analytics::AnalyticsAgent;
use super::config::AgentConfig;
use super::index::IndexAgent;
use super::provider::LlmProvider;
use super::router::{AgentKind, route};
use super::search::SearchAgent;
use super::traits::{Agent, AgentResponse};
use crate::backend::SearchBackend;

/// Routes queries to agents and runs them.
///
/// Holds no per-query state; concurrent [`AgentSystem::handle`] calls each
/// own their transcript.
pub struct AgentSystem {
    provider: Arc<dyn LlmProvider>,
    backend: Arc<dyn SearchBackend>,
    search: SearchAgent,
    index: IndexAgent,
    analytics: AnalyticsAgent,
}

impl AgentSystem {
    /// Builds the three agents from `config` around a shared provider and
    /// backend.
    #[must_use]
    pub fn new(
        config: &AgentConfig,
        provider: Arc<dyn LlmProvider>,
        backend: Arc<dyn SearchBackend>,
    ) -> Self {
        Self {
            provider,
            backend,
            search: SearchAgent::new(config),
            index: IndexAgent::new(config),
            analytics: AnalyticsAgent::new(config),
        }
    }

    /// Returns the agent serving `kind`.
    #[must_use]
    pub fn agent(&self, kind: AgentKind) -> &dyn Agent {
        match kind {
            AgentKind::Search => &self.search,
            AgentKind::IndexManagement => &self.index,
            AgentKind::Analytics => &self.analytics,
        }
    }

    /// Routes `query` and runs the chosen agent on it.
    pub async fn handle(&self, query: &str) -> (AgentKind, AgentResponse) {
        let kind = route(query);
        info!(
            agent = kind.as_str(),
            provider = self.provider.name(),
            backend = self.backend.name(),
            "routed query"
        );
        let response = self
            .agent(kind)
            .execute(self.provider.as_ref(), self.backend.as_ref(), query)
            .await;
        (kind, response)
    }
}
