//! Agentic query system.
//!
//! Routes a natural-language request to one of three tool-calling agents
//! and drives the model until it produces an answer. Uses a pluggable
//! provider abstraction backed by OpenAI-compatible APIs.
//!
//! # Architecture
//!
//! ```text
//! User query → AgentSystem → route()
//!   ├── SearchAgent      (search_documents, list_indices, get_index_info)
//!   ├── IndexAgent       (create/delete index, document writes, bulk)
//!   └── AnalyticsAgent   (terms, date_histogram, stats, cardinality, multi)
//!         │
//!         └── agentic_loop: LlmProvider ⇄ ToolExecutor ⇄ SearchBackend
//! ```

pub mod agentic_loop;
pub mod analytics;
pub mod client;
pub mod config;
pub mod executor;
pub mod index;
pub mod message;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod router;
pub mod search;
pub mod system;
pub mod tool;
pub mod traits;

// Re-export key types
pub use agentic_loop::{LoopOutcome, agentic_loop};
pub use analytics::AnalyticsAgent;
pub use client::create_provider;
pub use config::AgentConfig;
pub use executor::ToolExecutor;
pub use index::IndexAgent;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Reply, TokenUsage, Transcript};
pub use provider::LlmProvider;
pub use router::{AgentKind, route};
pub use search::SearchAgent;
pub use system::AgentSystem;
pub use tool::{ToolCall, ToolDefinition, ToolResult, ToolSet};
pub use traits::{Agent, AgentResponse, AgentStatus, EXHAUSTED_MESSAGE};
