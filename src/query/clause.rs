//! Boolean query clauses and their Elasticsearch DSL rendering.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::date_range::parse_date_range;

/// Default fuzziness for [`QueryClause::Fuzzy`].
pub const DEFAULT_FUZZINESS: &str = "AUTO";

/// Boolean operator joining the terms of a `match` query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Any term may match.
    #[default]
    Or,
    /// All terms must match.
    And,
}

impl Operator {
    /// Returns the DSL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
        }
    }
}

/// Scoring strategy of a `multi_match` query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiMatchType {
    /// Score from the single best matching field.
    #[default]
    BestFields,
    /// Combine scores from every matching field.
    MostFields,
    /// Treat fields as one combined field.
    CrossFields,
    /// Phrase match on each field.
    Phrase,
    /// Phrase-prefix match on each field.
    PhrasePrefix,
}

impl MultiMatchType {
    /// Returns the DSL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BestFields => "best_fields",
            Self::MostFields => "most_fields",
            Self::CrossFields => "cross_fields",
            Self::Phrase => "phrase",
            Self::PhrasePrefix => "phrase_prefix",
        }
    }

    /// Parses a DSL keyword, falling back to `best_fields`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "most_fields" => Self::MostFields,
            "cross_fields" => Self::CrossFields,
            "phrase" => Self::Phrase,
            "phrase_prefix" => Self::PhrasePrefix,
            _ => Self::BestFields,
        }
    }
}

/// Bounds of a `range` clause. Absent bounds are omitted from the DSL.
///
/// An empty bound set renders as an unconstrained range; this is accepted
/// rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeBounds {
    /// Greater than or equal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<Value>,
    /// Less than or equal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<Value>,
    /// Strictly greater than.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<Value>,
    /// Strictly less than.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<Value>,
}

impl RangeBounds {
    /// Returns `true` if no bound is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.gte.is_none() && self.lte.is_none() && self.gt.is_none() && self.lt.is_none()
    }

    fn to_dsl(&self) -> Value {
        let mut map = Map::new();
        let bounds = [
            ("gte", &self.gte),
            ("lte", &self.lte),
            ("gt", &self.gt),
            ("lt", &self.lt),
        ];
        for (key, bound) in bounds {
            if let Some(v) = bound {
                map.insert(key.to_string(), v.clone());
            }
        }
        Value::Object(map)
    }
}

/// The four clause lists of a `bool` query.
#[derive(Debug, Clone, PartialEq)]
pub struct BoolQuery {
    /// Clauses that must match and contribute to score.
    pub must: Vec<QueryClause>,
    /// Clauses of which at least `minimum_should_match` must match.
    pub should: Vec<QueryClause>,
    /// Clauses that must not match.
    pub must_not: Vec<QueryClause>,
    /// Clauses that must match without scoring.
    pub filter: Vec<QueryClause>,
    /// Only rendered when `should` is non-empty.
    pub minimum_should_match: u32,
}

impl Default for BoolQuery {
    fn default() -> Self {
        Self {
            must: Vec::new(),
            should: Vec::new(),
            must_not: Vec::new(),
            filter: Vec::new(),
            minimum_should_match: 1,
        }
    }
}

impl BoolQuery {
    /// Returns `true` if all four clause lists are empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.must.is_empty()
            && self.should.is_empty()
            && self.must_not.is_empty()
            && self.filter.is_empty()
    }
}

/// One node of a search query expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryClause {
    /// Matches every document.
    MatchAll,
    /// Full-text match on one field.
    Match {
        /// Field name.
        field: String,
        /// Text to analyze and match.
        query: String,
        /// How analyzed terms combine.
        operator: Operator,
    },
    /// Exact value match.
    Term {
        /// Field name.
        field: String,
        /// Exact value.
        value: Value,
    },
    /// Exact match against any of several values.
    Terms {
        /// Field name.
        field: String,
        /// Accepted values.
        values: Vec<Value>,
    },
    /// Range match.
    Range {
        /// Field name.
        field: String,
        /// Bounds; may be empty.
        bounds: RangeBounds,
    },
    /// Wildcard pattern (`*`, `?`).
    Wildcard {
        /// Field name.
        field: String,
        /// Pattern.
        pattern: String,
    },
    /// Prefix match.
    Prefix {
        /// Field name.
        field: String,
        /// Prefix.
        value: String,
    },
    /// Full-text match across several fields.
    MultiMatch {
        /// Text to match.
        query: String,
        /// Fields to search.
        fields: Vec<String>,
        /// Scoring strategy.
        kind: MultiMatchType,
    },
    /// Field has any value.
    Exists {
        /// Field name.
        field: String,
    },
    /// Edit-distance match.
    Fuzzy {
        /// Field name.
        field: String,
        /// Value to approximate.
        value: String,
        /// `AUTO`, `0`, `1` or `2`.
        fuzziness: String,
    },
    /// Boolean combination; may nest any clause including itself.
    Bool(BoolQuery),
}

impl QueryClause {
    /// `match` with the default `or` operator.
    #[must_use]
    pub fn match_text(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self::Match {
            field: field.into(),
            query: query.into(),
            operator: Operator::Or,
        }
    }

    /// `term` clause.
    #[must_use]
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `range` clause.
    #[must_use]
    pub fn range(field: impl Into<String>, bounds: RangeBounds) -> Self {
        Self::Range {
            field: field.into(),
            bounds,
        }
    }

    /// `range` clause whose bounds come from a natural-language phrase.
    ///
    /// Unrecognized text yields an unconstrained range.
    #[must_use]
    pub fn date_range_from_text(field: impl Into<String>, text: &str) -> Self {
        Self::range(field, parse_date_range(text))
    }

    /// `multi_match` with the default `best_fields` strategy.
    #[must_use]
    pub fn multi_match(query: impl Into<String>, fields: Vec<String>) -> Self {
        Self::MultiMatch {
            query: query.into(),
            fields,
            kind: MultiMatchType::BestFields,
        }
    }

    /// `fuzzy` clause with `AUTO` fuzziness.
    #[must_use]
    pub fn fuzzy(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Fuzzy {
            field: field.into(),
            value: value.into(),
            fuzziness: DEFAULT_FUZZINESS.to_string(),
        }
    }

    /// Renders the clause as an Elasticsearch DSL tree.
    #[must_use]
    pub fn to_dsl(&self) -> Value {
        match self {
            Self::MatchAll => json!({ "match_all": {} }),
            Self::Match {
                field,
                query,
                operator,
            } => json!({
                "match": { field.as_str(): { "query": query, "operator": operator.as_str() } }
            }),
            Self::Term { field, value } => json!({ "term": { field.as_str(): value } }),
            Self::Terms { field, values } => json!({ "terms": { field.as_str(): values } }),
            Self::Range { field, bounds } => {
                json!({ "range": { field.as_str(): bounds.to_dsl() } })
            }
            Self::Wildcard { field, pattern } => {
                json!({ "wildcard": { field.as_str(): pattern } })
            }
            Self::Prefix { field, value } => json!({ "prefix": { field.as_str(): value } }),
            Self::MultiMatch {
                query,
                fields,
                kind,
            } => json!({
                "multi_match": { "query": query, "fields": fields, "type": kind.as_str() }
            }),
            Self::Exists { field } => json!({ "exists": { "field": field } }),
            Self::Fuzzy {
                field,
                value,
                fuzziness,
            } => json!({
                "fuzzy": { field.as_str(): { "value": value, "fuzziness": fuzziness } }
            }),
            Self::Bool(b) => json!({ "bool": bool_body(b) }),
        }
    }
}

fn bool_body(b: &BoolQuery) -> Value {
    let render = |clauses: &[QueryClause]| -> Value {
        Value::Array(clauses.iter().map(QueryClause::to_dsl).collect())
    };

    let mut body = Map::new();
    if !b.must.is_empty() {
        body.insert("must".to_string(), render(&b.must));
    }
    if !b.should.is_empty() {
        body.insert("should".to_string(), render(&b.should));
        body.insert(
            "minimum_should_match".to_string(),
            Value::from(b.minimum_should_match),
        );
    }
    if !b.must_not.is_empty() {
        body.insert("must_not".to_string(), render(&b.must_not));
    }
    if !b.filter.is_empty() {
        body.insert("filter".to_string(), render(&b.filter));
    }
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_match_all() {
        assert_eq!(QueryClause::MatchAll.to_dsl(), json!({"match_all": {}}));
    }

    #[test]
    fn test_match_default_operator() {
        let dsl = QueryClause::match_text("title", "red shoes").to_dsl();
        assert_eq!(
            dsl,
            json!({"match": {"title": {"query": "red shoes", "operator": "or"}}})
        );
    }

    #[test]
    fn test_term_and_terms() {
        assert_eq!(
            QueryClause::term("status", "active").to_dsl(),
            json!({"term": {"status": "active"}})
        );
        let terms = QueryClause::Terms {
            field: "tag".to_string(),
            values: vec![json!("a"), json!(2)],
        };
        assert_eq!(terms.to_dsl(), json!({"terms": {"tag": ["a", 2]}}));
    }

    #[test]
    fn test_range_without_bounds_is_unconstrained() {
        let dsl = QueryClause::range("price", RangeBounds::default()).to_dsl();
        assert_eq!(dsl, json!({"range": {"price": {}}}));
    }

    #[test]
    fn test_range_with_bounds() {
        let bounds = RangeBounds {
            gte: Some(json!(10)),
            lt: Some(json!(20)),
            ..RangeBounds::default()
        };
        let dsl = QueryClause::range("price", bounds).to_dsl();
        assert_eq!(dsl, json!({"range": {"price": {"gte": 10, "lt": 20}}}));
    }

    #[test]
    fn test_date_range_from_text() {
        let dsl = QueryClause::date_range_from_text("created_at", "orders from last month").to_dsl();
        assert_eq!(dsl, json!({"range": {"created_at": {"gte": "now-1M/d"}}}));
    }

    #[test]
    fn test_multi_match() {
        let dsl = QueryClause::multi_match("laptop", vec!["title".into(), "body".into()]).to_dsl();
        assert_eq!(
            dsl,
            json!({"multi_match": {"query": "laptop", "fields": ["title", "body"], "type": "best_fields"}})
        );
    }

    #[test]
    fn test_exists_and_fuzzy() {
        assert_eq!(
            QueryClause::Exists { field: "email".into() }.to_dsl(),
            json!({"exists": {"field": "email"}})
        );
        assert_eq!(
            QueryClause::fuzzy("name", "jonh").to_dsl(),
            json!({"fuzzy": {"name": {"value": "jonh", "fuzziness": "AUTO"}}})
        );
    }

    #[test]
    fn test_empty_bool_has_no_clause_keys() {
        let dsl = QueryClause::Bool(BoolQuery::default()).to_dsl();
        assert_eq!(dsl, json!({"bool": {}}));
    }

    #[test]
    fn test_bool_should_carries_minimum_should_match() {
        let b = BoolQuery {
            should: vec![QueryClause::term("a", 1), QueryClause::term("b", 2)],
            ..BoolQuery::default()
        };
        let dsl = QueryClause::Bool(b).to_dsl();
        assert_eq!(dsl["bool"]["minimum_should_match"], json!(1));
        assert_eq!(dsl["bool"]["should"].as_array().map(Vec::len), Some(2));
        assert!(dsl["bool"].get("must").is_none());
    }

    #[test]
    fn test_nested_bool() {
        let inner = BoolQuery {
            must_not: vec![QueryClause::term("deleted", true)],
            ..BoolQuery::default()
        };
        let outer = BoolQuery {
            must: vec![QueryClause::match_text("title", "rust")],
            filter: vec![QueryClause::Bool(inner)],
            ..BoolQuery::default()
        };
        let dsl = QueryClause::Bool(outer).to_dsl();
        assert_eq!(
            dsl["bool"]["filter"][0],
            json!({"bool": {"must_not": [{"term": {"deleted": true}}]}})
        );
    }

    #[test]
    fn test_multi_match_type_parse() {
        assert_eq!(MultiMatchType::parse("PHRASE"), MultiMatchType::Phrase);
        assert_eq!(MultiMatchType::parse("bogus"), MultiMatchType::BestFields);
    }

    fn arb_leaf() -> impl Strategy<Value = QueryClause> {
        prop_oneof![
            Just(QueryClause::MatchAll),
            ("[a-z]{1,8}", "[a-z ]{0,12}").prop_map(|(f, q)| QueryClause::match_text(f, q)),
            ("[a-z]{1,8}", any::<i64>()).prop_map(|(f, v)| QueryClause::term(f, v)),
            ("[a-z]{1,8}", "[a-z*?]{1,6}")
                .prop_map(|(field, pattern)| QueryClause::Wildcard { field, pattern }),
            ("[a-z]{1,8}", proptest::option::of(any::<i32>())).prop_map(|(f, gte)| {
                QueryClause::range(
                    f,
                    RangeBounds {
                        gte: gte.map(Value::from),
                        ..RangeBounds::default()
                    },
                )
            }),
        ]
    }

    fn arb_clause() -> impl Strategy<Value = QueryClause> {
        arb_leaf().prop_recursive(3, 24, 4, |inner| {
            (
                prop::collection::vec(inner.clone(), 0..3),
                prop::collection::vec(inner.clone(), 0..3),
                prop::collection::vec(inner.clone(), 0..3),
                prop::collection::vec(inner, 0..3),
                1u32..3,
            )
                .prop_map(|(must, should, must_not, filter, msm)| {
                    QueryClause::Bool(BoolQuery {
                        must,
                        should,
                        must_not,
                        filter,
                        minimum_should_match: msm,
                    })
                })
        })
    }

    proptest! {
        #[test]
        fn prop_rendering_is_deterministic(clause in arb_clause()) {
            let first = serde_json::to_string(&clause.to_dsl()).unwrap_or_default();
            let second = serde_json::to_string(&clause.clone().to_dsl()).unwrap_or_default();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_minimum_should_match_only_with_should(clause in arb_clause()) {
            if let QueryClause::Bool(b) = &clause {
                let dsl = clause.to_dsl();
                let has_msm = dsl["bool"].get("minimum_should_match").is_some();
                prop_assert_eq!(has_msm, !b.should.is_empty());
            }
        }
    }
}
