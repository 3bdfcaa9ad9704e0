//! # es-agent
//!
//! Natural-language agents for Elasticsearch.
//!
//! A request is routed by keyword to one of three agents (search, index
//! management, analytics). The chosen agent runs a bounded tool-calling
//! conversation with an LLM; each tool call is turned into query DSL by the
//! [`query`] builders and executed through a [`backend::SearchBackend`].
//!
//! ## Layout
//!
//! - [`query`]: query clauses, date phrases and aggregations to DSL
//! - [`backend`]: the backend trait and its Elasticsearch implementation
//! - [`agent`]: router, agents, tool dispatcher, loop and LLM providers
//! - [`cli`]: one-shot and interactive front end
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use es_agent::agent::{AgentConfig, AgentSystem, create_provider};
//! use es_agent::backend::{BackendConfig, ElasticsearchBackend};
//!
//! # async fn run() -> es_agent::Result<()> {
//! let config = AgentConfig::from_env()?;
//! let backend = ElasticsearchBackend::new(&BackendConfig::from_env())?;
//! let system = AgentSystem::new(&config, create_provider(&config)?, Arc::new(backend));
//!
//! let (kind, response) = system.handle("How many orders were placed?").await;
//! println!("[{kind}] {}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod backend;
pub mod cli;
pub mod error;
pub mod query;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
