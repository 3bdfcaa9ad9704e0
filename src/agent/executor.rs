//! Tool executor that dispatches tool calls to the search backend.
//!
//! Maps tool names to query/aggregation builder calls plus one
//! [`SearchBackend`] operation, then reshapes the result into a compact JSON
//! payload for the model. Every failure (unknown tool, bad arguments,
//! backend error) becomes an `{"error": ...}` payload; nothing escalates.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use super::tool::{ToolCall, ToolResult, ToolSet};
use crate::backend::{
    AggregateResponse, AggregationResult, Bucket, SearchBackend, StatsBundle,
    sanitize_index_name,
};
use crate::error::ToolError;
use crate::query::{
    AggregationSpec, BoolQuery, DEFAULT_INTERVAL, DEFAULT_TERMS_SIZE, NamedAggregations,
    QueryClause, RangeBounds,
};

/// Maximum raw byte length of tool argument JSON from the LLM.
const MAX_TOOL_ARGS_LEN: usize = 100_000;
/// Default number of hits for `search_documents`.
const DEFAULT_SEARCH_SIZE: u64 = 10;
/// Fields searched by `multi_match` when none are given.
const DEFAULT_MULTI_MATCH_FIELDS: [&str; 5] = ["title", "description", "content", "name", "text"];

/// Executes tool calls against a [`SearchBackend`].
///
/// Only tools in the agent's [`ToolSet`] are dispatched; anything else is
/// reported back as an unknown tool.
pub struct ToolExecutor<'a> {
    backend: &'a dyn SearchBackend,
    tools: &'a ToolSet,
}

impl<'a> ToolExecutor<'a> {
    /// Creates an executor for the given backend and tool catalogue.
    #[must_use]
    pub const fn new(backend: &'a dyn SearchBackend, tools: &'a ToolSet) -> Self {
        Self { backend, tools }
    }

    /// Dispatches a tool call and returns its serialized payload.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let (payload, is_error) = match self.dispatch(call).await {
            Ok(payload) => (payload, false),
            Err(e) => {
                debug!(tool = call.name, error = %e, "tool call failed");
                (json!({ "error": e.to_string() }), true)
            }
        };

        ToolResult {
            tool_call_id: call.id.clone(),
            content: payload.to_string(),
            is_error,
        }
    }

    async fn dispatch(&self, call: &ToolCall) -> Result<Value, ToolError> {
        if !self.tools.contains(&call.name) {
            return Err(ToolError::UnknownTool(call.name.clone()));
        }
        if call.arguments.len() > MAX_TOOL_ARGS_LEN {
            return Err(ToolError::InvalidArguments(format!(
                "tool arguments too large ({} bytes, max {MAX_TOOL_ARGS_LEN})",
                call.arguments.len()
            )));
        }
        let args = parse_arguments(&call.arguments)?;

        match call.name.as_str() {
            "search_documents" => self.tool_search_documents(args).await,
            "list_indices" => self.tool_list_indices().await,
            "get_index_info" => self.tool_get_index_info(args).await,
            "create_index" => self.tool_create_index(args).await,
            "delete_index" => self.tool_delete_index(args).await,
            "index_document" => self.tool_index_document(args).await,
            "bulk_index_documents" => self.tool_bulk_index_documents(args).await,
            "update_document" => self.tool_update_document(args).await,
            "delete_document" => self.tool_delete_document(args).await,
            "terms_aggregation" => self.tool_terms_aggregation(args).await,
            "date_histogram" => self.tool_date_histogram(args).await,
            "stats_aggregation" => self.tool_stats_aggregation(args).await,
            "cardinality_aggregation" => self.tool_cardinality_aggregation(args).await,
            "multi_aggregation" => self.tool_multi_aggregation(args).await,
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    // -----------------------------------------------------------------------
    // Search tools
    // -----------------------------------------------------------------------

    /// Builds a query from the arguments and runs it.
    async fn tool_search_documents(&self, args: Value) -> Result<Value, ToolError> {
        #[derive(Deserialize)]
        struct Args {
            index: Option<String>,
            size: Option<u64>,
            #[serde(flatten)]
            spec: QuerySpec,
        }
        let args: Args = decode(args)?;
        let index = required_text(args.index, "index")?;
        required_text(args.spec.query_type.clone(), "query_type")?;

        let query = args.spec.to_clause().unwrap_or(QueryClause::MatchAll);
        let size = args.size.unwrap_or(DEFAULT_SEARCH_SIZE);
        let hits = self.backend.search(&index, &query.to_dsl(), size).await?;

        let documents: Vec<Value> = hits
            .hits
            .iter()
            .map(|h| json!({ "id": h.id, "score": h.score, "source": h.source }))
            .collect();
        Ok(json!({ "total": hits.total, "documents": documents }))
    }

    async fn tool_list_indices(&self) -> Result<Value, ToolError> {
        let indices = self.backend.list_indices().await?;
        Ok(json!({ "count": indices.len(), "indices": indices }))
    }

    async fn tool_get_index_info(&self, args: Value) -> Result<Value, ToolError> {
        #[derive(Deserialize)]
        struct Args {
            index: Option<String>,
        }
        let args: Args = decode(args)?;
        let index = required_text(args.index, "index")?;
        let info = self.backend.get_index_info(&index).await?;
        Ok(json!({
            "index": info.index,
            "fields": info.fields,
            "document_count": info.document_count,
        }))
    }

    // -----------------------------------------------------------------------
    // Index-management tools
    // -----------------------------------------------------------------------

    async fn tool_create_index(&self, args: Value) -> Result<Value, ToolError> {
        #[derive(Deserialize)]
        struct Args {
            index: Option<String>,
            mappings: Option<Value>,
            settings: Option<Value>,
        }
        let args: Args = decode(args)?;
        let requested = required_text(args.index, "index")?;
        let index = sanitize_index_name(&requested);
        if index.is_empty() {
            return Err(ToolError::InvalidArguments(format!(
                "'{requested}' is not a usable index name"
            )));
        }

        self.backend
            .create_index(&index, args.mappings.as_ref(), args.settings.as_ref())
            .await?;
        Ok(json!({
            "success": true,
            "index": index,
            "message": format!("Index '{index}' created successfully"),
        }))
    }

    async fn tool_delete_index(&self, args: Value) -> Result<Value, ToolError> {
        #[derive(Deserialize)]
        struct Args {
            index: Option<String>,
        }
        let args: Args = decode(args)?;
        let index = required_text(args.index, "index")?;
        self.backend.delete_index(&index).await?;
        Ok(json!({
            "success": true,
            "message": format!("Index '{index}' deleted successfully"),
        }))
    }

    async fn tool_index_document(&self, args: Value) -> Result<Value, ToolError> {
        #[derive(Deserialize)]
        struct Args {
            index: Option<String>,
            document: Option<Value>,
            doc_id: Option<Value>,
        }
        let args: Args = decode(args)?;
        let index = required_text(args.index, "index")?;
        let document = required_object(args.document, "document")?;
        let doc_id = args.doc_id.as_ref().and_then(value_text);

        let doc = self
            .backend
            .index_document(&index, &document, doc_id.as_deref())
            .await?;
        Ok(json!({
            "success": true,
            "doc_id": doc.id,
            "index": doc.index,
            "message": format!("Document indexed successfully with ID: {}", doc.id),
        }))
    }

    /// Indexes all documents in one batch request.
    ///
    /// `total` is always the submitted count and `indexed + failed` never
    /// exceeds it, whatever the backend reports.
    async fn tool_bulk_index_documents(&self, args: Value) -> Result<Value, ToolError> {
        #[derive(Deserialize)]
        struct Args {
            index: Option<String>,
            documents: Option<Vec<Value>>,
        }
        let args: Args = decode(args)?;
        let index = required_text(args.index, "index")?;
        let documents = args
            .documents
            .ok_or(ToolError::MissingArgument("documents"))?;

        let summary = self.backend.bulk_index(&index, &documents).await?;
        let total = documents.len();
        let indexed = summary.succeeded.min(total);
        let failed = summary.failed.min(total - indexed);
        Ok(json!({
            "success": true,
            "total": total,
            "indexed": indexed,
            "failed": failed,
            "message": format!("Indexed {indexed} documents successfully"),
        }))
    }

    async fn tool_update_document(&self, args: Value) -> Result<Value, ToolError> {
        #[derive(Deserialize)]
        struct Args {
            index: Option<String>,
            doc_id: Option<Value>,
            update: Option<Value>,
        }
        let args: Args = decode(args)?;
        let index = required_text(args.index, "index")?;
        let doc_id = required_id(args.doc_id.as_ref())?;
        let update = required_object(args.update, "update")?;

        self.backend.update_document(&index, &doc_id, &update).await?;
        Ok(json!({
            "success": true,
            "doc_id": doc_id,
            "message": format!("Document {doc_id} updated successfully"),
        }))
    }

    async fn tool_delete_document(&self, args: Value) -> Result<Value, ToolError> {
        #[derive(Deserialize)]
        struct Args {
            index: Option<String>,
            doc_id: Option<Value>,
        }
        let args: Args = decode(args)?;
        let index = required_text(args.index, "index")?;
        let doc_id = required_id(args.doc_id.as_ref())?;

        self.backend.delete_document(&index, &doc_id).await?;
        Ok(json!({
            "success": true,
            "doc_id": doc_id,
            "message": format!("Document {doc_id} deleted successfully"),
        }))
    }

    // -----------------------------------------------------------------------
    // Analytics tools
    // -----------------------------------------------------------------------

    async fn aggregate(
        &self,
        index: &str,
        aggregations: &NamedAggregations,
        query: Option<Value>,
    ) -> Result<AggregateResponse, ToolError> {
        let query = match query {
            None => None,
            Some(q @ Value::Object(_)) => Some(q),
            Some(_) => {
                return Err(ToolError::InvalidArguments(
                    "'query' must be an object".to_string(),
                ));
            }
        };
        let dsl = AggregationSpec::Composite(aggregations.clone()).to_dsl();
        Ok(self.backend.aggregate(index, &dsl, query.as_ref()).await?)
    }

    async fn tool_terms_aggregation(&self, args: Value) -> Result<Value, ToolError> {
        let args: AggregationArgs = decode(args)?;
        let index = required_text(args.index, "index")?;
        let field = required_text(args.field, "field")?;
        let size = args.size.unwrap_or(DEFAULT_TERMS_SIZE);

        let named = NamedAggregations::single("top_terms", AggregationSpec::terms(field, size));
        let response = self.aggregate(&index, &named, args.query).await?;

        let results: Vec<Value> = buckets(&response, "top_terms")
            .iter()
            .map(term_bucket)
            .collect();
        Ok(json!({ "total_docs": response.total, "results": results }))
    }

    async fn tool_date_histogram(&self, args: Value) -> Result<Value, ToolError> {
        let args: AggregationArgs = decode(args)?;
        let index = required_text(args.index, "index")?;
        let field = required_text(args.field, "field")?;
        let interval = required_text(args.interval, "interval")?;

        let named = NamedAggregations::single(
            "timeline",
            AggregationSpec::date_histogram(field, interval),
        );
        let response = self.aggregate(&index, &named, args.query).await?;

        let timeline: Vec<Value> = buckets(&response, "timeline")
            .iter()
            .map(|b| {
                let date = b
                    .key_as_string
                    .clone()
                    .map_or_else(|| b.key.clone(), Value::String);
                json!({ "date": date, "count": b.doc_count })
            })
            .collect();
        Ok(json!({ "total_docs": response.total, "timeline": timeline }))
    }

    async fn tool_stats_aggregation(&self, args: Value) -> Result<Value, ToolError> {
        let args: AggregationArgs = decode(args)?;
        let index = required_text(args.index, "index")?;
        let field = required_text(args.field, "field")?;

        let named = NamedAggregations::single("statistics", AggregationSpec::Stats { field });
        let response = self.aggregate(&index, &named, args.query).await?;

        let stats = match response.aggregations.get("statistics") {
            Some(AggregationResult::Stats(s)) => s.clone(),
            _ => StatsBundle::default(),
        };
        Ok(json!({ "total_docs": response.total, "statistics": stats_value(&stats) }))
    }

    async fn tool_cardinality_aggregation(&self, args: Value) -> Result<Value, ToolError> {
        let args: AggregationArgs = decode(args)?;
        let index = required_text(args.index, "index")?;
        let field = required_text(args.field, "field")?;

        let named =
            NamedAggregations::single("unique_count", AggregationSpec::Cardinality { field });
        let response = self.aggregate(&index, &named, args.query).await?;

        let unique = match response.aggregations.get("unique_count") {
            Some(AggregationResult::Value(v)) => v.clone(),
            _ => Value::Null,
        };
        Ok(json!({ "total_docs": response.total, "unique_count": unique }))
    }

    /// Runs several named aggregations in one request.
    ///
    /// Unsupported types are skipped; a missing type or a repeated name is
    /// an error.
    async fn tool_multi_aggregation(&self, args: Value) -> Result<Value, ToolError> {
        #[derive(Deserialize)]
        struct Definition {
            name: Option<String>,
            #[serde(rename = "type")]
            kind: Option<String>,
            field: Option<String>,
            params: Option<Map<String, Value>>,
        }
        #[derive(Deserialize)]
        struct Args {
            index: Option<String>,
            aggregations: Option<Vec<Definition>>,
            query: Option<Value>,
        }
        let args: Args = decode(args)?;
        let index = required_text(args.index, "index")?;
        let definitions = args
            .aggregations
            .ok_or(ToolError::MissingArgument("aggregations"))?;

        let mut named = NamedAggregations::new();
        for def in definitions {
            let kind = required_text(def.kind, "type")?;
            let params = def.params.unwrap_or_default();
            if !is_supported_aggregation(&kind) {
                warn!(kind = %kind, "skipping unsupported aggregation type");
                continue;
            }
            let name = required_text(def.name, "name")?;
            let field = required_text(def.field, "field")?;

            let spec = match kind.as_str() {
                "terms" => AggregationSpec::terms(
                    field,
                    params
                        .get("size")
                        .and_then(Value::as_u64)
                        .unwrap_or(DEFAULT_TERMS_SIZE),
                ),
                "date_histogram" => AggregationSpec::date_histogram(
                    field,
                    params
                        .get("interval")
                        .and_then(Value::as_str)
                        .unwrap_or(DEFAULT_INTERVAL),
                ),
                "stats" => AggregationSpec::Stats { field },
                "avg" => AggregationSpec::Avg { field },
                "sum" => AggregationSpec::Sum { field },
                _ => AggregationSpec::Cardinality { field },
            };
            named.insert(name, spec)?;
        }

        let response = self.aggregate(&index, &named, args.query).await?;
        let aggregations: Map<String, Value> = response
            .aggregations
            .iter()
            .map(|(name, result)| (name.clone(), result_value(result)))
            .collect();
        Ok(json!({ "total_docs": response.total, "aggregations": aggregations }))
    }
}

// ---------------------------------------------------------------------------
// Query translation
// ---------------------------------------------------------------------------

/// Query description shared by `search_documents` and its bool conditions.
#[derive(Debug, Default, Deserialize)]
struct QuerySpec {
    query_type: Option<String>,
    field: Option<String>,
    value: Option<Value>,
    fields: Option<Vec<String>>,
    #[serde(flatten)]
    bounds: RangeBounds,
    conditions: Option<Vec<Condition>>,
}

/// One entry of a bool query's `conditions`.
#[derive(Debug, Deserialize)]
struct Condition {
    clause: Option<String>,
    #[serde(flatten)]
    spec: QuerySpec,
}

impl QuerySpec {
    /// Translates to a clause, or `None` when the type is unsupported or its
    /// inputs are incomplete.
    fn to_clause(&self) -> Option<QueryClause> {
        let field = self.field.as_deref().filter(|f| !f.trim().is_empty());
        let text = self.value.as_ref().and_then(value_text);

        match self.query_type.as_deref()? {
            "match" => Some(QueryClause::match_text(field?, text?)),
            "term" => {
                text.as_ref()?;
                Some(QueryClause::term(field?, self.value.clone()?))
            }
            "range" => {
                let field = field?;
                Some(if self.bounds.is_empty() {
                    QueryClause::date_range_from_text(field, text.as_deref().unwrap_or_default())
                } else {
                    QueryClause::range(field, self.bounds.clone())
                })
            }
            "multi_match" => {
                let fields = self
                    .fields
                    .clone()
                    .filter(|f| !f.is_empty())
                    .unwrap_or_else(|| {
                        DEFAULT_MULTI_MATCH_FIELDS
                            .iter()
                            .map(ToString::to_string)
                            .collect()
                    });
                Some(QueryClause::multi_match(text?, fields))
            }
            "wildcard" => Some(QueryClause::Wildcard {
                field: field?.to_string(),
                pattern: text?,
            }),
            "prefix" => Some(QueryClause::Prefix {
                field: field?.to_string(),
                value: text?,
            }),
            "exists" => Some(QueryClause::Exists {
                field: field?.to_string(),
            }),
            "fuzzy" => Some(QueryClause::fuzzy(field?, text?)),
            "bool" => self.to_bool_clause(),
            _ => None,
        }
    }

    /// Sorts conditions into clause lists. Conditions that do not translate
    /// are skipped.
    fn to_bool_clause(&self) -> Option<QueryClause> {
        let conditions = self.conditions.as_deref().filter(|c| !c.is_empty())?;
        let mut query = BoolQuery::default();

        for condition in conditions {
            let Some(clause) = condition.spec.to_clause() else {
                continue;
            };
            match condition.clause.as_deref().unwrap_or("must") {
                "must" => query.must.push(clause),
                "should" => query.should.push(clause),
                "must_not" => query.must_not.push(clause),
                "filter" => query.filter.push(clause),
                _ => {}
            }
        }
        Some(QueryClause::Bool(query))
    }
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

/// Arguments shared by the single-aggregation analytics tools.
#[derive(Deserialize)]
struct AggregationArgs {
    index: Option<String>,
    field: Option<String>,
    size: Option<u64>,
    interval: Option<String>,
    query: Option<Value>,
}

/// Decodes raw argument text into a JSON object. Blank text is `{}`.
fn parse_arguments(raw: &str) -> Result<Value, ToolError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(v @ Value::Object(_)) => Ok(v),
        Ok(_) => Err(ToolError::InvalidArguments(
            "expected a JSON object".to_string(),
        )),
        Err(e) => Err(ToolError::InvalidArguments(e.to_string())),
    }
}

fn decode<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

fn required_text(value: Option<String>, name: &'static str) -> Result<String, ToolError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ToolError::MissingArgument(name))
}

fn required_object(value: Option<Value>, name: &'static str) -> Result<Value, ToolError> {
    match value {
        None => Err(ToolError::MissingArgument(name)),
        Some(v @ Value::Object(_)) => Ok(v),
        Some(_) => Err(ToolError::InvalidArguments(format!(
            "'{name}' must be an object"
        ))),
    }
}

/// Document ids may arrive as strings or numbers.
fn required_id(value: Option<&Value>) -> Result<String, ToolError> {
    value
        .and_then(value_text)
        .ok_or(ToolError::MissingArgument("doc_id"))
}

/// Text form of a scalar argument; `None` for null or blank strings.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn is_supported_aggregation(kind: &str) -> bool {
    matches!(
        kind,
        "terms" | "date_histogram" | "stats" | "avg" | "sum" | "cardinality"
    )
}

// ---------------------------------------------------------------------------
// Result shaping
// ---------------------------------------------------------------------------

fn buckets<'r>(response: &'r AggregateResponse, name: &str) -> &'r [Bucket] {
    match response.aggregations.get(name) {
        Some(AggregationResult::Buckets(b)) => b,
        _ => &[],
    }
}

fn term_bucket(bucket: &Bucket) -> Value {
    json!({ "value": bucket.key, "count": bucket.doc_count })
}

fn stats_value(stats: &StatsBundle) -> Value {
    json!({
        "count": stats.count,
        "sum": stats.sum,
        "avg": stats.avg,
        "min": stats.min,
        "max": stats.max,
    })
}

fn result_value(result: &AggregationResult) -> Value {
    match result {
        AggregationResult::Buckets(b) => Value::Array(b.iter().map(term_bucket).collect()),
        AggregationResult::Value(v) | AggregationResult::Raw(v) => v.clone(),
        AggregationResult::Stats(s) => stats_value(s),
    }
}
