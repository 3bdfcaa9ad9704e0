//! Tool type definitions for function-calling.
//!
//! Provides provider-agnostic types for tool definitions, calls, and results,
//! plus the catalogue each agent exposes to the model. Every tool maps to a
//! backend operation in [`ToolExecutor`](super::executor::ToolExecutor).

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A tool definition that can be sent to an LLM for function-calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match dispatch table in executor).
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub parameters: Value,
}

/// A tool call requested by the LLM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call (assigned by the provider).
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON-encoded arguments for the tool.
    pub arguments: String,
}

/// The result of executing a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this result corresponds to.
    pub tool_call_id: String,
    /// Serialized JSON payload; `{"error": ...}` on failure.
    pub content: String,
    /// Whether this result represents an error.
    pub is_error: bool,
}

/// A set of tool definitions scoped to an agent role.
///
/// - Search: `search_documents`, `list_indices`, `get_index_info`
/// - Index management: `create_index`, `delete_index`, `index_document`,
///   `bulk_index_documents`, `update_document`, `delete_document`,
///   `list_indices`
/// - Analytics: `terms_aggregation`, `date_histogram`, `stats_aggregation`,
///   `cardinality_aggregation`, `multi_aggregation`
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    definitions: Vec<ToolDefinition>,
}

impl ToolSet {
    /// Returns the tool definitions in this set.
    #[must_use]
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Returns `true` if a tool with this name is in the set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.iter().any(|d| d.name == name)
    }

    /// Returns `true` if this set contains no tools.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns the number of tools in this set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Tool set for the search agent.
    #[must_use]
    pub fn search_tools() -> Self {
        Self {
            definitions: vec![def_search_documents(), def_list_indices(), def_get_index_info()],
        }
    }

    /// Tool set for the index-management agent.
    #[must_use]
    pub fn index_tools() -> Self {
        Self {
            definitions: vec![
                def_create_index(),
                def_delete_index(),
                def_index_document(),
                def_bulk_index_documents(),
                def_update_document(),
                def_delete_document(),
                def_list_indices(),
            ],
        }
    }

    /// Tool set for the analytics agent.
    #[must_use]
    pub fn analytics_tools() -> Self {
        Self {
            definitions: vec![
                def_terms_aggregation(),
                def_date_histogram(),
                def_stats_aggregation(),
                def_cardinality_aggregation(),
                def_multi_aggregation(),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Tool schema definitions
// ---------------------------------------------------------------------------

fn def(name: &str, description: &str, parameters: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        parameters,
    }
}

/// Schema fragment shared by the analytics tools.
fn filter_query_property() -> Value {
    json!({
        "type": "object",
        "description": "Optional Elasticsearch query to filter documents before aggregation."
    })
}

fn def_search_documents() -> ToolDefinition {
    let condition = json!({
        "type": "object",
        "description": "One bool condition. Nested 'bool' conditions carry their own 'conditions'.",
        "properties": {
            "clause": {
                "type": "string",
                "enum": ["must", "should", "must_not", "filter"],
                "description": "Clause list to place the condition in (default must)."
            },
            "query_type": { "type": "string" },
            "field": { "type": "string" },
            "value": { "type": "string" },
            "conditions": { "type": "array", "items": { "type": "object" } }
        }
    });
    def(
        "search_documents",
        "Search for documents in an Elasticsearch index using a query.",
        json!({
            "type": "object",
            "properties": {
                "index": {
                    "type": "string",
                    "description": "The name of the index to search."
                },
                "query_type": {
                    "type": "string",
                    "enum": [
                        "match", "term", "range", "bool", "multi_match",
                        "wildcard", "prefix", "exists", "fuzzy"
                    ],
                    "description": "Type of query to execute."
                },
                "field": {
                    "type": "string",
                    "description": "Field name to search (match, term, range, wildcard, prefix, exists, fuzzy)."
                },
                "value": {
                    "type": "string",
                    "description": "Value to search for. For range queries without explicit bounds, a phrase like 'last week'."
                },
                "fields": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Fields for multi_match (defaults to title, description, content, name, text)."
                },
                "gte": { "description": "Range lower bound (inclusive)." },
                "lte": { "description": "Range upper bound (inclusive)." },
                "gt": { "description": "Range lower bound (exclusive)." },
                "lt": { "description": "Range upper bound (exclusive)." },
                "size": {
                    "type": "integer",
                    "description": "Number of results to return.",
                    "default": 10
                },
                "conditions": {
                    "type": "array",
                    "description": "For bool queries: conditions with 'clause' (must/should/must_not/filter), 'query_type', 'field', 'value'.",
                    "items": condition
                }
            },
            "required": ["index", "query_type"]
        }),
    )
}

fn def_list_indices() -> ToolDefinition {
    def(
        "list_indices",
        "List all available Elasticsearch indices.",
        json!({ "type": "object", "properties": {} }),
    )
}

fn def_get_index_info() -> ToolDefinition {
    def(
        "get_index_info",
        "Get information about an index: mapped fields and document count.",
        json!({
            "type": "object",
            "properties": {
                "index": { "type": "string", "description": "Index name." }
            },
            "required": ["index"]
        }),
    )
}

fn def_create_index() -> ToolDefinition {
    def(
        "create_index",
        "Create a new Elasticsearch index.",
        json!({
            "type": "object",
            "properties": {
                "index": { "type": "string", "description": "Index name (will be sanitized)." },
                "mappings": { "type": "object", "description": "Index mappings defining field types." },
                "settings": { "type": "object", "description": "Index settings (shards, replicas, etc.)." }
            },
            "required": ["index"]
        }),
    )
}

fn def_delete_index() -> ToolDefinition {
    def(
        "delete_index",
        "Delete an Elasticsearch index.",
        json!({
            "type": "object",
            "properties": {
                "index": { "type": "string", "description": "Index name to delete." }
            },
            "required": ["index"]
        }),
    )
}

fn def_index_document() -> ToolDefinition {
    def(
        "index_document",
        "Index a single document.",
        json!({
            "type": "object",
            "properties": {
                "index": { "type": "string", "description": "Index name." },
                "document": { "type": "object", "description": "Document to index." },
                "doc_id": { "type": "string", "description": "Optional document ID." }
            },
            "required": ["index", "document"]
        }),
    )
}

fn def_bulk_index_documents() -> ToolDefinition {
    def(
        "bulk_index_documents",
        "Index multiple documents in one request.",
        json!({
            "type": "object",
            "properties": {
                "index": { "type": "string", "description": "Index name." },
                "documents": {
                    "type": "array",
                    "description": "Documents to index.",
                    "items": { "type": "object" }
                }
            },
            "required": ["index", "documents"]
        }),
    )
}

fn def_update_document() -> ToolDefinition {
    def(
        "update_document",
        "Update fields of an existing document.",
        json!({
            "type": "object",
            "properties": {
                "index": { "type": "string", "description": "Index name." },
                "doc_id": { "type": "string", "description": "Document ID." },
                "update": { "type": "object", "description": "Fields to update." }
            },
            "required": ["index", "doc_id", "update"]
        }),
    )
}

fn def_delete_document() -> ToolDefinition {
    def(
        "delete_document",
        "Delete a document.",
        json!({
            "type": "object",
            "properties": {
                "index": { "type": "string", "description": "Index name." },
                "doc_id": { "type": "string", "description": "Document ID to delete." }
            },
            "required": ["index", "doc_id"]
        }),
    )
}

fn def_terms_aggregation() -> ToolDefinition {
    def(
        "terms_aggregation",
        "Group documents by field value and count occurrences (top N most common values).",
        json!({
            "type": "object",
            "properties": {
                "index": { "type": "string", "description": "Index name." },
                "field": { "type": "string", "description": "Field to aggregate on (keyword type)." },
                "size": {
                    "type": "integer",
                    "description": "Number of top buckets to return.",
                    "default": 10
                },
                "query": filter_query_property()
            },
            "required": ["index", "field"]
        }),
    )
}

fn def_date_histogram() -> ToolDefinition {
    def(
        "date_histogram",
        "Count documents per time period (hour, day, week, month, year).",
        json!({
            "type": "object",
            "properties": {
                "index": { "type": "string", "description": "Index name." },
                "field": { "type": "string", "description": "Date field to histogram on." },
                "interval": {
                    "type": "string",
                    "enum": ["1h", "1d", "1w", "1M", "1y"],
                    "description": "Bucket interval."
                },
                "query": filter_query_property()
            },
            "required": ["index", "field", "interval"]
        }),
    )
}

fn def_stats_aggregation() -> ToolDefinition {
    def(
        "stats_aggregation",
        "Calculate count, sum, avg, min and max of a numeric field.",
        json!({
            "type": "object",
            "properties": {
                "index": { "type": "string", "description": "Index name." },
                "field": { "type": "string", "description": "Numeric field to analyze." },
                "query": filter_query_property()
            },
            "required": ["index", "field"]
        }),
    )
}

fn def_cardinality_aggregation() -> ToolDefinition {
    def(
        "cardinality_aggregation",
        "Count unique values of a field.",
        json!({
            "type": "object",
            "properties": {
                "index": { "type": "string", "description": "Index name." },
                "field": { "type": "string", "description": "Field to count unique values of." },
                "query": filter_query_property()
            },
            "required": ["index", "field"]
        }),
    )
}

fn def_multi_aggregation() -> ToolDefinition {
    def(
        "multi_aggregation",
        "Run several named aggregations in one request.",
        json!({
            "type": "object",
            "properties": {
                "index": { "type": "string", "description": "Index name." },
                "aggregations": {
                    "type": "array",
                    "description": "Aggregation definitions with unique names.",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "type": {
                                "type": "string",
                                "enum": ["terms", "date_histogram", "stats", "avg", "sum", "cardinality"]
                            },
                            "field": { "type": "string" },
                            "params": {
                                "type": "object",
                                "description": "terms: {size}; date_histogram: {interval}."
                            }
                        },
                        "required": ["name", "type", "field"]
                    }
                },
                "query": filter_query_property()
            },
            "required": ["index", "aggregations"]
        }),
    )
}
