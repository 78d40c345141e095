//! NQL wire encoding
//!
//! Turns a [`Filter`] tree into the single-string form Ghost accepts in the
//! `filter` query parameter. Encoding is deterministic: operand order is
//! preserved and a given tree always yields the same string.

use crate::error::ApiError;
use crate::nql::filter::{Filter, Predicate, Value};

/// Bare words that survive unquoted: letters, digits, `_`, `-`.
fn is_safe_word(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Property paths: dot-separated segments of word characters.
fn is_valid_property(s: &str) -> bool {
    !s.is_empty() && s.split('.').all(is_safe_word)
}

fn encode_string(s: &str) -> String {
    if is_safe_word(s) {
        s.to_string()
    } else {
        // Single-quoted form; only the quote itself needs escaping.
        format!("'{}'", s.replace('\'', "\\'"))
    }
}

fn encode_value(value: &Value) -> Result<String, ApiError> {
    Ok(match value {
        Value::Str(s) => encode_string(s),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => {
            if !f.is_finite() {
                return Err(ApiError::InvalidFilter(format!(
                    "non-finite float value: {f}"
                )));
            }
            f.to_string()
        }
        Value::Bool(b) => b.to_string(),
        Value::Relative(rel) => {
            if rel.amount < 0 {
                format!("now-{}{}", -rel.amount, rel.suffix())
            } else {
                format!("now+{}{}", rel.amount, rel.suffix())
            }
        }
    })
}

fn encode_leaf(property: &str, predicate: &Predicate) -> Result<String, ApiError> {
    if !is_valid_property(property) {
        return Err(ApiError::InvalidFilter(format!(
            "invalid property name: {property:?}"
        )));
    }

    let rhs = match predicate {
        Predicate::Eq(v) => encode_value(v)?,
        Predicate::Ne(v) => format!("-{}", encode_value(v)?),
        Predicate::Gt(v) => format!(">{}", encode_value(v)?),
        Predicate::Gte(v) => format!(">={}", encode_value(v)?),
        Predicate::Lt(v) => format!("<{}", encode_value(v)?),
        Predicate::Lte(v) => format!("<={}", encode_value(v)?),
        Predicate::Contains(s) => format!("~{}", encode_string(s)),
        Predicate::StartsWith(s) => format!("~^{}", encode_string(s)),
        Predicate::EndsWith(s) => format!("~${}", encode_string(s)),
        Predicate::In(values) => {
            if values.is_empty() {
                return Err(ApiError::InvalidFilter(format!(
                    "empty value list for property {property:?}"
                )));
            }
            let rendered: Vec<String> =
                values.iter().map(encode_value).collect::<Result<_, _>>()?;
            format!("[{}]", rendered.join(","))
        }
        Predicate::Null => "null".to_string(),
        Predicate::NotNull => "-null".to_string(),
    };

    Ok(format!("{property}:{rhs}"))
}

/// Whether `child` needs parentheses when rendered as an operand of a
/// combinator. Leaves never do; a nested combinator always does, so the
/// rendered string carries explicit grouping instead of leaning on the
/// server's precedence rules.
fn needs_parens(child: &Filter) -> bool {
    matches!(child, Filter::And(_) | Filter::Or(_))
}

fn encode_node(filter: &Filter) -> Result<String, ApiError> {
    match filter {
        Filter::Leaf { property, predicate } => encode_leaf(property, predicate),
        Filter::And(operands) => encode_combinator(operands, "+"),
        Filter::Or(operands) => encode_combinator(operands, ","),
    }
}

fn encode_combinator(operands: &[Filter], joiner: &str) -> Result<String, ApiError> {
    match operands {
        [] => Err(ApiError::InvalidFilter(
            "combinator with no operands".to_string(),
        )),
        // A single operand collapses to itself; no joiner, no parens.
        [only] => encode_node(only),
        many => {
            let mut parts = Vec::with_capacity(many.len());
            for child in many {
                let rendered = encode_node(child)?;
                if needs_parens(child) {
                    parts.push(format!("({rendered})"));
                } else {
                    parts.push(rendered);
                }
            }
            Ok(parts.join(joiner))
        }
    }
}

impl Filter {
    /// Renders the tree to the wire string.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidFilter`] for an invalid property name, a
    /// non-finite float value, an empty `in` list, or a combinator with no
    /// operands.
    pub fn encode(&self) -> Result<String, ApiError> {
        encode_node(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nql::filter::RelativeDate;

    /// Validates `Filter::encode` behavior for each single-predicate
    /// operator.
    ///
    /// Assertions:
    /// - Ensures every operator renders its documented wire form.
    #[test]
    fn encodes_each_operator() {
        let cases: Vec<(Filter, &str)> = vec![
            (Filter::eq("status", "published"), "status:published"),
            (Filter::ne("status", "draft"), "status:-draft"),
            (Filter::gt("reading_time", 5), "reading_time:>5"),
            (Filter::gte("reading_time", 5), "reading_time:>=5"),
            (Filter::lt("reading_time", 10), "reading_time:<10"),
            (Filter::lte("reading_time", 10), "reading_time:<=10"),
            (Filter::contains("title", "rust"), "title:~rust"),
            (Filter::starts_with("slug", "how-to"), "slug:~^how-to"),
            (Filter::ends_with("slug", "guide"), "slug:~$guide"),
            (
                Filter::one_of("tag", vec!["news".into(), "updates".into()]),
                "tag:[news,updates]",
            ),
            (Filter::is_null("featured_image"), "featured_image:null"),
            (Filter::is_not_null("published_at"), "published_at:-null"),
        ];

        for (filter, expected) in cases {
            assert_eq!(filter.encode().unwrap(), expected);
        }
    }

    /// Validates `Filter::encode` behavior for the value quoting scenario.
    ///
    /// Assertions:
    /// - Ensures safe bare words stay unquoted.
    /// - Ensures strings with spaces or punctuation are single-quoted.
    /// - Confirms embedded quotes are backslash-escaped.
    #[test]
    fn quotes_unsafe_strings() {
        assert_eq!(
            Filter::eq("slug", "hello-world_2").encode().unwrap(),
            "slug:hello-world_2"
        );
        assert_eq!(
            Filter::eq("title", "Hello World").encode().unwrap(),
            "title:'Hello World'"
        );
        assert_eq!(
            Filter::eq("title", "it's here").encode().unwrap(),
            "title:'it\\'s here'"
        );
    }

    /// Validates `Filter::encode` behavior for non-string value types.
    ///
    /// Assertions:
    /// - Ensures booleans and numbers render bare.
    /// - Confirms relative dates render as `now` arithmetic.
    #[test]
    fn renders_scalar_values() {
        assert_eq!(Filter::eq("featured", true).encode().unwrap(), "featured:true");
        assert_eq!(Filter::eq("visibility_score", 2.5).encode().unwrap(), "visibility_score:2.5");
        assert_eq!(
            Filter::gt("published_at", RelativeDate::days_ago(3))
                .encode()
                .unwrap(),
            "published_at:>now-3d"
        );
    }

    /// Validates `Filter::encode` behavior for the nested combinator
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures AND joins with `+` and OR joins with `,`.
    /// - Confirms a nested combinator is parenthesized inside its parent.
    #[test]
    fn parenthesizes_nested_combinators() {
        let filter = Filter::and(vec![
            Filter::eq("status", "published"),
            Filter::or(vec![Filter::eq("tag", "news"), Filter::eq("tag", "updates")]),
        ]);
        assert_eq!(
            filter.encode().unwrap(),
            "status:published+(tag:news,tag:updates)"
        );

        let filter = Filter::or(vec![
            Filter::and(vec![Filter::eq("featured", true), Filter::is_not_null("image")]),
            Filter::eq("status", "draft"),
        ]);
        assert_eq!(
            filter.encode().unwrap(),
            "(featured:true+image:-null),status:draft"
        );
    }

    /// Validates `Filter::encode` behavior for the single-operand
    /// combinator scenario.
    ///
    /// Assertions:
    /// - Ensures a one-element combinator collapses to its operand with no
    ///   joiner or parentheses.
    #[test]
    fn collapses_single_operand_combinator() {
        let filter = Filter::and(vec![Filter::eq("status", "published")]);
        assert_eq!(filter.encode().unwrap(), "status:published");

        let filter = Filter::or(vec![Filter::and(vec![Filter::eq("tag", "news")])]);
        assert_eq!(filter.encode().unwrap(), "tag:news");
    }

    /// Validates `Filter::encode` behavior for the dotted relation
    /// property scenario.
    ///
    /// Assertions:
    /// - Ensures dot-separated property paths are accepted verbatim.
    #[test]
    fn accepts_relation_properties() {
        assert_eq!(
            Filter::eq("authors.slug", "cameron").encode().unwrap(),
            "authors.slug:cameron"
        );
    }

    /// Validates `Filter::encode` behavior for the invalid-input scenarios.
    ///
    /// Assertions:
    /// - Ensures a malformed property name is rejected.
    /// - Ensures an empty `in` list is rejected.
    /// - Confirms an empty combinator is rejected.
    #[test]
    fn rejects_invalid_trees() {
        let err = Filter::eq("status name", "x").encode().unwrap_err();
        assert!(matches!(err, ApiError::InvalidFilter(_)));

        let err = Filter::one_of("tag", vec![]).encode().unwrap_err();
        assert!(matches!(err, ApiError::InvalidFilter(_)));

        let err = Filter::and(vec![]).encode().unwrap_err();
        assert!(matches!(err, ApiError::InvalidFilter(_)));
    }

    /// Validates `Filter::encode` behavior for the non-finite float
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures NaN and infinite values are rejected instead of rendering
    ///   as `NaN`/`inf` literals the server cannot parse.
    /// - Confirms the rejection also applies inside `in` lists.
    #[test]
    fn rejects_non_finite_floats() {
        let err = Filter::eq("score", f64::NAN).encode().unwrap_err();
        assert!(matches!(err, ApiError::InvalidFilter(_)));

        let err = Filter::gt("score", f64::INFINITY).encode().unwrap_err();
        assert!(matches!(err, ApiError::InvalidFilter(_)));

        let err = Filter::one_of("score", vec![Value::Float(1.0), Value::Float(f64::NEG_INFINITY)])
            .encode()
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidFilter(_)));
    }
}
