//! Search backend adapter.
//!
//! [`SearchBackend`] is the boundary between the tool dispatcher and the
//! document store. It accepts DSL trees produced by [`crate::query`] and
//! returns typed results or a [`BackendError`]; implementations never panic
//! on backend failures.

pub mod config;
pub mod elasticsearch;
pub mod index_name;
pub mod types;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BackendError;

pub use config::BackendConfig;
pub use elasticsearch::ElasticsearchBackend;
pub use index_name::sanitize_index_name;
pub use types::{
    AggregateResponse, AggregationResult, Bucket, BulkSummary, DocumentRef, Hit, IndexInfo,
    SearchHits, StatsBundle,
};

/// Operations the agents may perform against the document store.
///
/// Implementations must be safe to share across concurrent agent runs.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Runs `query` against `index`, returning at most `size` hits.
    async fn search(&self, index: &str, query: &Value, size: u64)
    -> Result<SearchHits, BackendError>;

    /// Runs `aggregations` (an `aggs` body) over documents matching `query`.
    async fn aggregate(
        &self,
        index: &str,
        aggregations: &Value,
        query: Option<&Value>,
    ) -> Result<AggregateResponse, BackendError>;

    /// Creates an index with optional mappings and settings.
    async fn create_index(
        &self,
        index: &str,
        mappings: Option<&Value>,
        settings: Option<&Value>,
    ) -> Result<(), BackendError>;

    /// Deletes an index.
    async fn delete_index(&self, index: &str) -> Result<(), BackendError>;

    /// Stores one document, under `id` when given.
    async fn index_document(
        &self,
        index: &str,
        document: &Value,
        id: Option<&str>,
    ) -> Result<DocumentRef, BackendError>;

    /// Stores many documents in one batch request.
    ///
    /// Per-document rejections are counted, not raised.
    async fn bulk_index(&self, index: &str, documents: &[Value])
    -> Result<BulkSummary, BackendError>;

    /// Merges `update` into an existing document.
    async fn update_document(
        &self,
        index: &str,
        id: &str,
        update: &Value,
    ) -> Result<(), BackendError>;

    /// Deletes a document.
    async fn delete_document(&self, index: &str, id: &str) -> Result<(), BackendError>;

    /// Lists user-visible index names (system indices excluded).
    async fn list_indices(&self) -> Result<Vec<String>, BackendError>;

    /// Returns mapped fields and document count for an index.
    async fn get_index_info(&self, index: &str) -> Result<IndexInfo, BackendError>;
}
