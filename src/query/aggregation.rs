//! Aggregation specs and their Elasticsearch DSL rendering.

use serde_json::{Map, Value, json};

use crate::error::QueryError;

/// Default bucket count for terms aggregations.
pub const DEFAULT_TERMS_SIZE: u64 = 10;
/// Default date histogram interval.
pub const DEFAULT_INTERVAL: &str = "1d";

/// Single-unit intervals Elasticsearch accepts as `calendar_interval`.
const CALENDAR_INTERVALS: &[&str] = &[
    "1m", "1h", "1d", "1w", "1M", "1q", "1y", "minute", "hour", "day", "week", "month", "quarter",
    "year",
];

/// A backend-side computation over a filtered document set.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationSpec {
    /// Top-N buckets by distinct field value.
    Terms {
        /// Keyword field to group on.
        field: String,
        /// Number of buckets.
        size: u64,
    },
    /// Buckets per time interval.
    DateHistogram {
        /// Date field.
        field: String,
        /// Interval such as `1d`, `1w`, `1M`, or a fixed `12h`.
        interval: String,
    },
    /// Count, min, max, avg and sum of a numeric field.
    Stats {
        /// Numeric field.
        field: String,
    },
    /// Mean of a numeric field.
    Avg {
        /// Numeric field.
        field: String,
    },
    /// Sum of a numeric field.
    Sum {
        /// Numeric field.
        field: String,
    },
    /// Approximate distinct-value count.
    Cardinality {
        /// Field name.
        field: String,
    },
    /// Several independently named aggregations in one request.
    Composite(NamedAggregations),
}

impl AggregationSpec {
    /// `terms` aggregation.
    #[must_use]
    pub fn terms(field: impl Into<String>, size: u64) -> Self {
        Self::Terms {
            field: field.into(),
            size,
        }
    }

    /// `date_histogram` aggregation.
    #[must_use]
    pub fn date_histogram(field: impl Into<String>, interval: impl Into<String>) -> Self {
        Self::DateHistogram {
            field: field.into(),
            interval: interval.into(),
        }
    }

    /// Renders this aggregation as an Elasticsearch DSL tree.
    ///
    /// A composite renders as the body of an `aggs` object: one key per name.
    #[must_use]
    pub fn to_dsl(&self) -> Value {
        match self {
            Self::Terms { field, size } => json!({ "terms": { "field": field, "size": size } }),
            Self::DateHistogram { field, interval } => {
                let key = if CALENDAR_INTERVALS.contains(&interval.as_str()) {
                    "calendar_interval"
                } else {
                    "fixed_interval"
                };
                json!({ "date_histogram": { "field": field, key: interval } })
            }
            Self::Stats { field } => json!({ "stats": { "field": field } }),
            Self::Avg { field } => json!({ "avg": { "field": field } }),
            Self::Sum { field } => json!({ "sum": { "field": field } }),
            Self::Cardinality { field } => json!({ "cardinality": { "field": field } }),
            Self::Composite(named) => named.to_dsl(),
        }
    }
}

/// Uniquely named aggregation specs, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedAggregations {
    entries: Vec<(String, AggregationSpec)>,
}

impl NamedAggregations {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates a set holding a single aggregation.
    #[must_use]
    pub fn single(name: impl Into<String>, spec: AggregationSpec) -> Self {
        Self {
            entries: vec![(name.into(), spec)],
        }
    }

    /// Adds a named aggregation.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::DuplicateAggregationName`] if the name is taken,
    /// or [`QueryError::NestedComposite`] if `spec` is itself a composite.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        spec: AggregationSpec,
    ) -> Result<(), QueryError> {
        let name = name.into();
        if matches!(spec, AggregationSpec::Composite(_)) {
            return Err(QueryError::NestedComposite(name));
        }
        if self.entries.iter().any(|(n, _)| *n == name) {
            return Err(QueryError::DuplicateAggregationName(name));
        }
        self.entries.push((name, spec));
        Ok(())
    }

    /// Returns `true` if no aggregation has been added.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of aggregations.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over `(name, spec)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AggregationSpec)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Renders `{name: dsl, ...}`.
    #[must_use]
    pub fn to_dsl(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(name, spec)| (name.clone(), spec.to_dsl()))
            .collect();
        Value::Object(map)
    }
}
