//! Loosely-typed filter input.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::CoreError;

/// A multimap of raw filter values keyed by filter name.
///
/// Built either from URL query pairs (repeated keys accumulate, so
/// `triggered_atRange=a&triggered_atRange=b` becomes `[a, b]`) or from a JSON
/// object (arrays become the value list, scalars a single value).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterBag {
    values: BTreeMap<String, Vec<Value>>,
}

impl FilterBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded `key=value` pairs, preserving repeat order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut bag = Self::new();
        for (key, value) in pairs {
            bag.push(key, Value::String(value.into()));
        }
        bag
    }

    /// Build from a JSON object. Non-object input yields an empty bag.
    pub fn from_json(value: Value) -> Self {
        let mut bag = Self::new();
        if let Value::Object(map) = value {
            for (key, value) in map {
                match value {
                    Value::Array(items) => {
                        bag.values.entry(key).or_default().extend(items);
                    }
                    other => bag.push(key, other),
                }
            }
        }
        bag
    }

    pub fn push(&mut self, key: impl Into<String>, value: Value) {
        self.values.entry(key.into()).or_default().push(value);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// First value for `key` as text, or `None` when absent, null or blank.
    pub fn text(&self, key: &str) -> Option<String> {
        self.values.get(key)?.first().and_then(scalar_text)
    }

    /// Two-element `[start, end]` tuple for a range key.
    ///
    /// Missing positions and null/blank entries come back as `None`.
    pub fn range(&self, key: &str) -> Option<(Option<String>, Option<String>)> {
        let items = self.values.get(key)?;
        let start = items.first().and_then(scalar_text);
        let end = items.get(1).and_then(scalar_text);
        Some((start, end))
    }

    /// Boolean flag: native `true` or the literal string `"true"`; anything
    /// else is `false`. `None` when the key is absent.
    pub fn flag(&self, key: &str) -> Option<bool> {
        let first = self.values.get(key)?.first();
        Some(match first {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true",
            _ => false,
        })
    }

    /// Non-negative integer for `key`; `None` when absent or blank.
    pub fn integer(&self, key: &str) -> Result<Option<i64>, CoreError> {
        let Some(first) = self.values.get(key).and_then(|v| v.first()) else {
            return Ok(None);
        };
        match first {
            Value::Number(n) => n
                .as_i64()
                .map(|n| Some(n.max(0)))
                .ok_or_else(|| CoreError::Validation(format!("{key} must be an integer"))),
            other => match scalar_text(other) {
                None => Ok(None),
                Some(raw) => raw
                    .trim()
                    .parse::<i64>()
                    .map(|n| Some(n.max(0)))
                    .map_err(|_| CoreError::Validation(format!("{key} must be an integer"))),
            },
        }
    }
}

/// Render a scalar as text, treating null, blank strings and the literal
/// `"null"` / `"undefined"` that JS clients serialise as absent.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == "null" || trimmed == "undefined" {
                None
            } else {
                Some(s.clone())
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn repeated_pairs_accumulate_into_range() {
        let bag = FilterBag::from_pairs([
            ("triggered_atRange", "2024-01-01"),
            ("triggered_atRange", "2024-02-01"),
        ]);
        assert_eq!(
            bag.range("triggered_atRange"),
            Some((Some("2024-01-01".into()), Some("2024-02-01".into())))
        );
    }

    #[test]
    fn single_range_entry_leaves_end_open() {
        let bag = FilterBag::from_pairs([("triggered_atRange", "2024-01-01")]);
        assert_eq!(
            bag.range("triggered_atRange"),
            Some((Some("2024-01-01".into()), None))
        );
    }

    #[test]
    fn json_null_and_blank_bounds_are_open() {
        let bag = FilterBag::from_json(json!({
            "a": ["2024-01-01", null],
            "b": ["", "2024-03-01"],
        }));
        assert_eq!(bag.range("a"), Some((Some("2024-01-01".into()), None)));
        assert_eq!(bag.range("b"), Some((None, Some("2024-03-01".into()))));
    }

    #[test]
    fn blank_text_is_absent() {
        let bag = FilterBag::from_pairs([("message", "   ")]);
        assert_eq!(bag.text("message"), None);
        assert!(bag.contains_key("message"));
    }

    #[test]
    fn flag_accepts_native_bool_and_true_string_only() {
        assert_eq!(FilterBag::from_json(json!({"active": true})).flag("active"), Some(true));
        assert_eq!(FilterBag::from_pairs([("active", "true")]).flag("active"), Some(true));
        assert_eq!(FilterBag::from_pairs([("active", "TRUE")]).flag("active"), Some(false));
        assert_eq!(FilterBag::from_pairs([("active", "1")]).flag("active"), Some(false));
        assert_eq!(FilterBag::from_json(json!({"active": false})).flag("active"), Some(false));
        assert_eq!(FilterBag::new().flag("active"), None);
    }

    #[test]
    fn integer_parses_strings_and_numbers() {
        assert_eq!(FilterBag::from_pairs([("limit", "10")]).integer("limit").unwrap(), Some(10));
        assert_eq!(FilterBag::from_json(json!({"page": 2})).integer("page").unwrap(), Some(2));
        assert_eq!(FilterBag::from_pairs([("page", "")]).integer("page").unwrap(), None);
        assert_eq!(FilterBag::from_pairs([("page", "-3")]).integer("page").unwrap(), Some(0));
    }

    #[test]
    fn integer_rejects_garbage() {
        let bag = FilterBag::from_pairs([("limit", "ten")]);
        assert_matches!(bag.integer("limit"), Err(CoreError::Validation(_)));
    }
}
