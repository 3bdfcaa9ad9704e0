//! Query and aggregation builder.
//!
//! Pure, deterministic translation from typed clause and aggregation values
//! to Elasticsearch DSL trees (`serde_json::Value`). Nothing here performs
//! I/O.

pub mod aggregation;
pub mod clause;
pub mod date_range;

pub use aggregation::{AggregationSpec, DEFAULT_INTERVAL, DEFAULT_TERMS_SIZE, NamedAggregations};
pub use clause::{BoolQuery, MultiMatchType, Operator, QueryClause, RangeBounds};
pub use date_range::parse_date_range;
