//! Keyword-based intent routing.
//!
//! Picks which agent handles a query by lower-cased substring matching.
//! Index-management keywords win over analytics keywords; anything that
//! matches neither goes to search.

use std::fmt;

use serde::Serialize;

/// Phrases that route a query to the index-management agent.
const INDEX_KEYWORDS: &[&str] = &[
    "create index",
    "delete index",
    "index document",
    "bulk index",
    "update document",
    "delete document",
    "add data",
    "insert",
    "remove",
    "modify",
    "delete",
];

/// Phrases that route a query to the analytics agent.
const ANALYTICS_KEYWORDS: &[&str] = &[
    "analyze",
    "statistics",
    "average",
    "sum",
    "count",
    "top",
    "histogram",
    "trend",
    "distribution",
    "how many",
    "what is the",
    "calculate",
    "aggregate",
];

/// The agent a query is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Document lookup.
    Search,
    /// Index and document writes.
    IndexManagement,
    /// Aggregations and statistics.
    Analytics,
}

impl AgentKind {
    /// Machine-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::IndexManagement => "index_management",
            Self::Analytics => "analytics",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Search => "Search",
            Self::IndexManagement => "Index Management",
            Self::Analytics => "Analytics",
        };
        f.write_str(label)
    }
}

/// Classifies a query.
///
/// Matching is on raw substrings, so "top" also matches "laptop" and
/// "count" matches "country".
#[must_use]
pub fn route(query: &str) -> AgentKind {
    let query = query.to_lowercase();
    let matches = |keywords: &[&str]| keywords.iter().any(|k| query.contains(k));

    if matches(INDEX_KEYWORDS) {
        AgentKind::IndexManagement
    } else if matches(ANALYTICS_KEYWORDS) {
        AgentKind::Analytics
    } else {
        AgentKind::Search
    }
}
