//! In-memory doubles for [`SearchBackend`] and [`LlmProvider`] used by unit
//! tests.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::agent::message::{ChatRequest, ChatResponse, Reply, TokenUsage};
use crate::agent::provider::LlmProvider;
use crate::agent::tool::ToolCall;
use crate::backend::{
    AggregateResponse, BulkSummary, DocumentRef, IndexInfo, SearchBackend, SearchHits,
};
use crate::error::{AgentError, BackendError};

/// One backend operation observed by [`MockBackend`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub operation: &'static str,
    pub index: String,
    pub body: Value,
}

/// Backend returning canned results and recording every call.
#[derive(Default)]
pub struct MockBackend {
    calls: Mutex<Vec<RecordedCall>>,
    search: SearchHits,
    aggregate: AggregateResponse,
    indices: Vec<String>,
    index_info: IndexInfo,
    bulk_failures: usize,
    failure: Option<BackendError>,
}

impl MockBackend {
    pub fn with_search(mut self, hits: SearchHits) -> Self {
        self.search = hits;
        self
    }

    pub fn with_aggregate(mut self, response: AggregateResponse) -> Self {
        self.aggregate = response;
        self
    }

    pub fn with_indices(mut self, names: &[&str]) -> Self {
        self.indices = names.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_index_info(mut self, info: IndexInfo) -> Self {
        self.index_info = info;
        self
    }

    /// Reports `n` rejected documents on every bulk request, even if `n`
    /// exceeds the batch size.
    pub const fn with_bulk_failures(mut self, n: usize) -> Self {
        self.bulk_failures = n;
        self
    }

    /// Makes every operation fail with `error`.
    pub fn failing(mut self, error: BackendError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, operation: &'static str, index: &str, body: Value) -> Result<(), BackendError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                operation,
                index: index.to_string(),
                body,
            });
        self.failure.clone().map_or(Ok(()), Err)
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn search(
        &self,
        index: &str,
        query: &Value,
        size: u64,
    ) -> Result<SearchHits, BackendError> {
        self.record("search", index, json!({ "query": query, "size": size }))?;
        Ok(self.search.clone())
    }

    async fn aggregate(
        &self,
        index: &str,
        aggregations: &Value,
        query: Option<&Value>,
    ) -> Result<AggregateResponse, BackendError> {
        let mut body = json!({ "aggs": aggregations });
        if let Some(q) = query {
            body["query"] = q.clone();
        }
        self.record("aggregate", index, body)?;
        Ok(self.aggregate.clone())
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
        self.record("create_index", index, Value::Object(body))
    }

    async fn delete_index(&self, index: &str) -> Result<(), BackendError> {
        self.record("delete_index", index, Value::Null)
    }

    async fn index_document(
        &self,
        index: &str,
        document: &Value,
        id: Option<&str>,
    ) -> Result<DocumentRef, BackendError> {
        self.record("index_document", index, document.clone())?;
        Ok(DocumentRef {
            index: index.to_string(),
            id: id.unwrap_or("generated-id").to_string(),
        })
    }

    async fn bulk_index(
        &self,
        index: &str,
        documents: &[Value],
    ) -> Result<BulkSummary, BackendError> {
        self.record("bulk_index", index, Value::Array(documents.to_vec()))?;
        Ok(BulkSummary {
            total: documents.len(),
            succeeded: documents.len().saturating_sub(self.bulk_failures),
            failed: self.bulk_failures,
        })
    }

    async fn update_document(
        &self,
        index: &str,
        id: &str,
        update: &Value,
    ) -> Result<(), BackendError> {
        self.record("update_document", index, json!({ "id": id, "doc": update }))
    }

    async fn delete_document(&self, index: &str, id: &str) -> Result<(), BackendError> {
        self.record("delete_document", index, json!({ "id": id }))
    }

    async fn list_indices(&self) -> Result<Vec<String>, BackendError> {
        self.record("list_indices", "", Value::Null)?;
        Ok(self.indices.clone())
    }

    async fn get_index_info(&self, index: &str) -> Result<IndexInfo, BackendError> {
        self.record("get_index_info", index, Value::Null)?;
        Ok(self.index_info.clone())
    }
}

/// Provider replaying a fixed script of replies, then repeating the last
/// step forever.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<ChatRequest>>,
}

/// One scripted provider reply.
#[derive(Debug, Clone)]
pub enum Step {
    Text(&'static str),
    Tools(Vec<(&'static str, Value)>),
    Fail(&'static str),
}

impl ScriptedProvider {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Provider that requests `list_indices` on every round.
    pub fn always_tools() -> Self {
        Self::new(vec![Step::Tools(vec![("list_indices", json!({}))])])
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn next_step(&self) -> Step {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        if script.len() > 1 {
            script.pop_front().unwrap_or(Step::Text(""))
        } else {
            script.front().cloned().unwrap_or(Step::Text(""))
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        let round = {
            let mut requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
            requests.push(request.clone());
            requests.len()
        };
        let usage = TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        };

        let reply = match self.next_step() {
            Step::Text(text) => Reply::Text(text.to_string()),
            Step::Tools(calls) => Reply::ToolCalls {
                content: None,
                calls: calls
                    .into_iter()
                    .enumerate()
                    .map(|(i, (name, args))| ToolCall {
                        id: format!("call_{round}_{i}"),
                        name: name.to_string(),
                        arguments: args.to_string(),
                    })
                    .collect(),
            },
            Step::Fail(message) => {
                return Err(AgentError::ApiRequest {
                    message: message.to_string(),
                    status: Some(500),
                });
            }
        };

        Ok(ChatResponse {
            reply,
            usage,
            finish_reason: None,
        })
    }
}
