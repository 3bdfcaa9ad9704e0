//! Typed results returned by a [`SearchBackend`](super::SearchBackend).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One matching document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Document id.
    pub id: String,
    /// Relevance score (absent when sorting disables scoring).
    pub score: Option<f64>,
    /// Stored document body.
    pub source: Value,
}

/// Result of a search request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHits {
    /// Total matching documents (may exceed `hits.len()`).
    pub total: u64,
    /// Returned documents, in relevance order.
    pub hits: Vec<Hit>,
}

/// A bucket of a bucketing aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Bucket key (term value or epoch millis).
    pub key: Value,
    /// Formatted key, present for date histograms.
    pub key_as_string: Option<String>,
    /// Documents in the bucket.
    pub doc_count: u64,
}

/// Output of a `stats` aggregation. Metrics are `None` when no document
/// carried the field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsBundle {
    /// Number of values.
    pub count: u64,
    /// Smallest value.
    pub min: Option<f64>,
    /// Largest value.
    pub max: Option<f64>,
    /// Mean.
    pub avg: Option<f64>,
    /// Sum.
    pub sum: Option<f64>,
}

/// Result of one named aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationResult {
    /// Ordered buckets (terms, date histogram).
    Buckets(Vec<Bucket>),
    /// Single metric (cardinality, avg, sum).
    Value(Value),
    /// Stats bundle.
    Stats(StatsBundle),
    /// Shape not recognized; kept verbatim.
    Raw(Value),
}

impl AggregationResult {
    /// Classifies a raw aggregation object from the backend response.
    #[must_use]
    pub fn from_raw(raw: &Value) -> Self {
        if let Some(buckets) = raw.get("buckets").and_then(Value::as_array) {
            return Self::Buckets(
                buckets
                    .iter()
                    .map(|b| Bucket {
                        key: b.get("key").cloned().unwrap_or(Value::Null),
                        key_as_string: b
                            .get("key_as_string")
                            .and_then(Value::as_str)
                            .map(String::from),
                        doc_count: b.get("doc_count").and_then(Value::as_u64).unwrap_or(0),
                    })
                    .collect(),
            );
        }
        if let Some(value) = raw.get("value") {
            return Self::Value(value.clone());
        }
        if raw.get("count").is_some() && raw.get("avg").is_some() {
            return Self::Stats(StatsBundle {
                count: raw.get("count").and_then(Value::as_u64).unwrap_or(0),
                min: raw.get("min").and_then(Value::as_f64),
                max: raw.get("max").and_then(Value::as_f64),
                avg: raw.get("avg").and_then(Value::as_f64),
                sum: raw.get("sum").and_then(Value::as_f64),
            });
        }
        Self::Raw(raw.clone())
    }
}

/// Result of an aggregation request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResponse {
    /// Documents matched by the filter query.
    pub total: u64,
    /// Results keyed by aggregation name.
    pub aggregations: BTreeMap<String, AggregationResult>,
}

/// Acknowledgement for a single-document write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Index the document lives in.
    pub index: String,
    /// Document id (assigned by the backend when not supplied).
    pub id: String,
}

/// Outcome of a batch index request.
///
/// `total` is the number of documents submitted; `succeeded + failed` never
/// exceeds it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkSummary {
    /// Documents submitted.
    pub total: usize,
    /// Documents indexed.
    pub succeeded: usize,
    /// Documents rejected.
    pub failed: usize,
}

/// Condensed index metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    /// Index name.
    pub index: String,
    /// Top-level mapped field names.
    pub fields: Vec<String>,
    /// Primary document count.
    pub document_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_raw_terms_buckets() {
        let raw = json!({"buckets": [{"key": "books", "doc_count": 7}, {"key": "toys", "doc_count": 2}]});
        let AggregationResult::Buckets(buckets) = AggregationResult::from_raw(&raw) else {
            unreachable!("expected buckets");
        };
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key, json!("books"));
        assert_eq!(buckets[1].doc_count, 2);
    }

    #[test]
    fn test_from_raw_histogram_keeps_key_as_string() {
        let raw = json!({"buckets": [{"key": 1_700_000_000_000_u64, "key_as_string": "2023-11-14", "doc_count": 3}]});
        let AggregationResult::Buckets(buckets) = AggregationResult::from_raw(&raw) else {
            unreachable!("expected buckets");
        };
        assert_eq!(buckets[0].key_as_string.as_deref(), Some("2023-11-14"));
    }

    #[test]
    fn test_from_raw_value() {
        assert_eq!(
            AggregationResult::from_raw(&json!({"value": 42})),
            AggregationResult::Value(json!(42))
        );
    }

    #[test]
    fn test_from_raw_stats_with_nulls() {
        let raw = json!({"count": 0, "min": null, "max": null, "avg": null, "sum": 0.0});
        let AggregationResult::Stats(stats) = AggregationResult::from_raw(&raw) else {
            unreachable!("expected stats");
        };
        assert_eq!(stats.count, 0);
        assert!(stats.avg.is_none());
        assert_eq!(stats.sum, Some(0.0));
    }

    #[test]
    fn test_from_raw_unknown_shape() {
        let raw = json!({"values": {"50.0": 12.5}});
        assert_eq!(
            AggregationResult::from_raw(&raw),
            AggregationResult::Raw(raw.clone())
        );
    }
}
