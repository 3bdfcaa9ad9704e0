//! Elasticsearch implementation of [`SearchBackend`] over the REST API.

use std::fmt::Write as _;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use super::SearchBackend;
use super::config::BackendConfig;
use super::types::{
    AggregateResponse, AggregationResult, BulkSummary, DocumentRef, Hit, IndexInfo, SearchHits,
};
use crate::error::BackendError;

/// Error type Elasticsearch reports when creating an existing index.
const ALREADY_EXISTS_TYPE: &str = "resource_already_exists_exception";

/// Elasticsearch REST client.
pub struct ElasticsearchBackend {
    client: Client,
    base: Url,
    credentials: Option<(String, String)>,
}

impl std::fmt::Debug for ElasticsearchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticsearchBackend")
            .field("base", &self.base.as_str())
            .field("authenticated", &self.credentials.is_some())
            .finish()
    }
}

impl ElasticsearchBackend {
    /// Creates a client from connection settings. Does not contact the server.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Failure`] if the base URL is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let base = Url::parse(&config.url())
            .map_err(|e| BackendError::Failure(format!("invalid backend URL: {e}")))?;
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_certs)
            .build()
            .map_err(|e| BackendError::Failure(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base,
            credentials: config
                .credentials()
                .map(|(u, p)| (u.to_string(), p.to_string())),
        })
    }

    /// Contacts the server and returns its version string.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the server is unreachable or rejects the
    /// request.
    pub async fn ping(&self) -> Result<String, BackendError> {
        let body = self
            .send(self.request(Method::GET, &[])?, || {
                "Cluster root not found".to_string()
            })
            .await?;
        let version = body
            .pointer("/version/number")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        info!(version = %version, url = %self.base, "connected to Elasticsearch");
        Ok(version)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::Failure("backend URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, BackendError> {
        let url = self.endpoint(segments)?;
        let builder = self.client.request(method, url);
        Ok(match &self.credentials {
            Some((user, password)) => builder.basic_auth(user, Some(password)),
            None => builder,
        })
    }

    /// Sends a request and returns the JSON body, classifying HTTP failures.
    async fn send(
        &self,
        request: RequestBuilder,
        not_found: impl FnOnce() -> String,
    ) -> Result<Value, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Failure(format!("request failed: {e}")))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Failure(format!("failed to read response: {e}")))?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if status.is_success() {
            Ok(body)
        } else {
            let err = classify_failure(status, &body, not_found);
            warn!(status = status.as_u16(), error = %err, "backend request failed");
            Err(err)
        }
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchBackend {
    fn name(&self) -> &'static str {
        "elasticsearch"
    }

    async fn search(
        &self,
        index: &str,
        query: &Value,
        size: u64,
    ) -> Result<SearchHits, BackendError> {
        debug!(index, %query, size, "search");
        let request = self
            .request(Method::POST, &[index, "_search"])?
            .json(&json!({ "query": query, "size": size }));
        let body = self.send(request, || index_not_found(index)).await?;
        let hits = parse_search_hits(&body);
        info!(index, total = hits.total, "search complete");
        Ok(hits)
    }

    async fn aggregate(
        &self,
        index: &str,
        aggregations: &Value,
        query: Option<&Value>,
    ) -> Result<AggregateResponse, BackendError> {
        let mut body = json!({ "aggs": aggregations, "size": 0 });
        if let Some(q) = query {
            body["query"] = q.clone();
        }
        debug!(index, %body, "aggregate");
        let request = self
            .request(Method::POST, &[index, "_search"])?
            .json(&body);
        let response = self.send(request, || index_not_found(index)).await?;
        Ok(parse_aggregate_response(&response))
    }

    async fn create_index(
        &self,
        index: &str,
        mappings: Option<&Value>,
        settings: Option<&Value>,
    ) -> Result<(), BackendError> {
        let mut body = Map::new();
        if let Some(m) = mappings {
            body.insert("mappings".to_string(), m.clone());
        }
        if let Some(s) = settings {
            body.insert("settings".to_string(), s.clone());
        }
        let request = self
            .request(Method::PUT, &[index])?
            .json(&Value::Object(body));
        self.send(request, || index_not_found(index)).await?;
        info!(index, "index created");
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<(), BackendError> {
        let request = self.request(Method::DELETE, &[index])?;
        self.send(request, || index_not_found(index)).await?;
        info!(index, "index deleted");
        Ok(())
    }

    async fn index_document(
        &self,
        index: &str,
        document: &Value,
        id: Option<&str>,
    ) -> Result<DocumentRef, BackendError> {
        let request = match id {
            Some(id) => self.request(Method::PUT, &[index, "_doc", id])?,
            None => self.request(Method::POST, &[index, "_doc"])?,
        }
        .json(document);
        let body = self.send(request, || index_not_found(index)).await?;
        let doc = DocumentRef {
            index: body
                .get("_index")
                .and_then(Value::as_str)
                .unwrap_or(index)
                .to_string(),
            id: body
                .get("_id")
                .and_then(Value::as_str)
                .or(id)
                .unwrap_or_default()
                .to_string(),
        };
        info!(index = %doc.index, id = %doc.id, "document indexed");
        Ok(doc)
    }

    async fn bulk_index(
        &self,
        index: &str,
        documents: &[Value],
    ) -> Result<BulkSummary, BackendError> {
        if documents.is_empty() {
            return Ok(BulkSummary::default());
        }
        info!(index, count = documents.len(), "bulk indexing");
        let request = self
            .request(Method::POST, &["_bulk"])?
            .header("Content-Type", "application/x-ndjson")
            .body(bulk_body(index, documents));
        let body = self.send(request, || index_not_found(index)).await?;
        let summary = parse_bulk_summary(&body, documents.len());
        info!(
            index,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "bulk index complete"
        );
        Ok(summary)
    }

    async fn update_document(
        &self,
        index: &str,
        id: &str,
        update: &Value,
    ) -> Result<(), BackendError> {
        let request = self
            .request(Method::POST, &[index, "_update", id])?
            .json(&json!({ "doc": update }));
        self.send(request, || "Document not found".to_string())
            .await?;
        info!(index, id, "document updated");
        Ok(())
    }

    async fn delete_document(&self, index: &str, id: &str) -> Result<(), BackendError> {
        let request = self.request(Method::DELETE, &[index, "_doc", id])?;
        self.send(request, || "Document not found".to_string())
            .await?;
        info!(index, id, "document deleted");
        Ok(())
    }

    async fn list_indices(&self) -> Result<Vec<String>, BackendError> {
        let mut url = self.endpoint(&["_cat", "indices"])?;
        url.query_pairs_mut().append_pair("format", "json");
        let request = self.client.get(url);
        let request = match &self.credentials {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request,
        };
        let body = self.send(request, || "No indices found".to_string()).await?;
        let names = parse_index_names(&body);
        debug!(count = names.len(), "listed indices");
        Ok(names)
    }

    async fn get_index_info(&self, index: &str) -> Result<IndexInfo, BackendError> {
        let mapping = self
            .send(self.request(Method::GET, &[index, "_mapping"])?, || {
                index_not_found(index)
            })
            .await?;
        let stats = self
            .send(self.request(Method::GET, &[index, "_stats"])?, || {
                index_not_found(index)
            })
            .await?;
        Ok(parse_index_info(index, &mapping, &stats))
    }
}

fn index_not_found(index: &str) -> String {
    format!("Index '{index}' not found")
}

/// Maps an HTTP failure onto the backend error taxonomy.
fn classify_failure(
    status: StatusCode,
    body: &Value,
    not_found: impl FnOnce() -> String,
) -> BackendError {
    let error_type = body
        .pointer("/error/type")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let reason = body
        .pointer("/error/reason")
        .and_then(Value::as_str)
        .map(String::from)
        .or_else(|| body.as_str().map(String::from))
        .unwrap_or_else(|| format!("HTTP {status}"));

    match status.as_u16() {
        404 => BackendError::NotFound(not_found()),
        400 if error_type == ALREADY_EXISTS_TYPE => {
            BackendError::AlreadyExists("Index already exists".to_string())
        }
        400..=499 => BackendError::BadRequest(reason),
        _ => BackendError::Failure(reason),
    }
}

/// Reads `hits.total` in both the object (7.x+) and numeric (6.x) forms.
fn parse_total(body: &Value) -> u64 {
    let total = body.pointer("/hits/total");
    total
        .and_then(|t| t.get("value"))
        .and_then(Value::as_u64)
        .or_else(|| total.and_then(Value::as_u64))
        .unwrap_or(0)
}

fn parse_search_hits(body: &Value) -> SearchHits {
    let hits = body
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .map(|h| Hit {
                    id: h
                        .get("_id")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    score: h.get("_score").and_then(Value::as_f64),
                    source: h.get("_source").cloned().unwrap_or(Value::Null),
                })
                .collect()
        })
        .unwrap_or_default();

    SearchHits {
        total: parse_total(body),
        hits,
    }
}

fn parse_aggregate_response(body: &Value) -> AggregateResponse {
    let aggregations = body
        .get("aggregations")
        .and_then(Value::as_object)
        .map(|aggs| {
            aggs.iter()
                .map(|(name, raw)| (name.clone(), AggregationResult::from_raw(raw)))
                .collect()
        })
        .unwrap_or_default();

    AggregateResponse {
        total: parse_total(body),
        aggregations,
    }
}

fn bulk_body(index: &str, documents: &[Value]) -> String {
    let action = json!({ "index": { "_index": index } }).to_string();
    let mut body = String::new();
    for doc in documents {
        let _ = writeln!(body, "{action}");
        let _ = writeln!(body, "{doc}");
    }
    body
}

/// Counts per-item outcomes, never reporting more than `total` documents.
fn parse_bulk_summary(body: &Value, total: usize) -> BulkSummary {
    let mut summary = BulkSummary {
        total,
        ..BulkSummary::default()
    };
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for item in items.iter().take(total) {
        let outcome = item.get("index").or_else(|| item.get("create"));
        let failed = outcome.is_none_or(|o| {
            o.get("error").is_some()
                || o.get("status")
                    .and_then(Value::as_u64)
                    .is_some_and(|s| s >= 300)
        });
        if failed {
            summary.failed += 1;
        } else {
            summary.succeeded += 1;
        }
    }
    summary
}

fn parse_index_names(body: &Value) -> Vec<String> {
    body.as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|r| r.get("index").and_then(Value::as_str))
                .filter(|name| !name.starts_with('.'))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_index_info(index: &str, mapping: &Value, stats: &Value) -> IndexInfo {
    let fields = mapping
        .as_object()
        .and_then(|m| m.values().next())
        .and_then(|idx| idx.pointer("/mappings/properties"))
        .and_then(Value::as_object)
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default();
    let document_count = stats
        .pointer("/_all/primaries/docs/count")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    IndexInfo {
        index: index.to_string(),
        fields,
        document_count,
    }
}
