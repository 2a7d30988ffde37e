//! Typed predicate clauses.

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// A bindable filter value.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Id(DbId),
    Timestamp(Timestamp),
    Bool(bool),
}

/// One clause of a WHERE predicate. A list of these is combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column = value`
    Eq {
        column: &'static str,
        value: FilterValue,
    },
    /// `column ILIKE pattern`; `pattern` is already escaped and wrapped in `%`.
    Contains {
        column: &'static str,
        pattern: String,
    },
    /// `column >= value`
    Gte {
        column: &'static str,
        value: FilterValue,
    },
    /// `column <= value`
    Lte {
        column: &'static str,
        value: FilterValue,
    },
    /// Disjunction of the inner clauses. An empty list matches nothing.
    Any(Vec<Predicate>),
    /// Matches no row (an id filter that is not a valid UUID).
    MatchNone,
}

impl Predicate {
    /// Exact match on an id column. Input that does not parse as a UUID can
    /// never equal a stored id, so it yields [`Predicate::MatchNone`].
    pub fn id_eq(column: &'static str, raw: &str) -> Self {
        match raw.trim().parse::<DbId>() {
            Ok(id) => Predicate::Eq {
                column,
                value: FilterValue::Id(id),
            },
            Err(_) => Predicate::MatchNone,
        }
    }

    /// Case-insensitive substring match.
    pub fn contains(column: &'static str, needle: &str) -> Self {
        Predicate::Contains {
            column,
            pattern: contains_pattern(needle),
        }
    }
}

/// Build an `ILIKE` pattern matching `needle` literally anywhere in the value.
///
/// `\`, `%` and `_` are escaped with the default `\` escape character.
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Parse a timestamp range bound.
///
/// Accepts RFC 3339, `datetime-local` form values (`YYYY-MM-DDTHH:MM[:SS]`,
/// read as UTC) and bare dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Result<Timestamp, CoreError> {
    let raw = raw.trim();
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(CoreError::Validation(format!("Invalid timestamp: {raw}")))
}
