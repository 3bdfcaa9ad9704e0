//! Natural-language date phrases to relative range bounds.

use serde_json::Value;

use super::clause::RangeBounds;

/// Phrases checked in order; the first hit wins.
const PHRASES: &[(&[&str], Option<&str>, Option<&str>)] = &[
    (&["last week", "past week"], Some("now-1w/d"), None),
    (&["last month", "past month"], Some("now-1M/d"), None),
    (&["last year", "past year"], Some("now-1y/d"), None),
    (&["today"], Some("now/d"), None),
    (&["yesterday"], Some("now-1d/d"), Some("now-1d/d")),
];

/// Translates a free-text date description into range bounds.
///
/// Recognizes `today`, `yesterday`, and `last`/`past` `week`, `month` or
/// `year`, case-insensitively, anywhere in the text. Anything else yields
/// empty bounds, which callers must treat as unconstrained.
#[must_use]
pub fn parse_date_range(text: &str) -> RangeBounds {
    let lower = text.to_lowercase();

    PHRASES
        .iter()
        .find(|(needles, _, _)| needles.iter().any(|n| lower.contains(n)))
        .map_or_else(RangeBounds::default, |(_, gte, lte)| RangeBounds {
            gte: gte.map(Value::from),
            lte: lte.map(Value::from),
            ..RangeBounds::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn render(bounds: &RangeBounds) -> Value {
        serde_json::to_value(bounds).unwrap_or_default()
    }

    #[test_case("show records from last week", json!({"gte": "now-1w/d"}); "last week")]
    #[test_case("signups in the PAST WEEK", json!({"gte": "now-1w/d"}); "past week upper")]
    #[test_case("sales last month", json!({"gte": "now-1M/d"}); "last month")]
    #[test_case("revenue over the past year", json!({"gte": "now-1y/d"}); "past year")]
    #[test_case("errors today", json!({"gte": "now/d"}); "today")]
    #[test_case("yesterday's orders", json!({"gte": "now-1d/d", "lte": "now-1d/d"}); "yesterday")]
    #[test_case("whatever", json!({}); "unrecognized")]
    #[test_case("", json!({}); "empty")]
    fn test_parse_date_range(text: &str, expected: Value) {
        assert_eq!(render(&parse_date_range(text)), expected);
    }

    #[test]
    fn test_earlier_phrase_wins() {
        let bounds = parse_date_range("compare last year with last week");
        assert_eq!(render(&bounds), json!({"gte": "now-1w/d"}));
    }
}
