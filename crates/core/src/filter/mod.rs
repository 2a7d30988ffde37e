//! Filtered list query construction.
//!
//! [`ListQuery::from_bag`] walks an entity's [`EntitySchema`], picks out the
//! filter keys it recognises from a [`FilterBag`], and accumulates one typed
//! [`Predicate`] per constraint. Unrecognised keys are ignored; absent, null
//! and blank values add no clause.

mod bag;
mod paging;
mod predicate;
mod schema;

pub use bag::FilterBag;
pub use paging::{Ordering, Pagination, SortDirection};
pub use predicate::{contains_pattern, parse_timestamp, FilterValue, Predicate};
pub use schema::{EntitySchema, ReferenceFilter, COMMON_SORTABLE, CREATED_AT_RANGE_KEYS};

use crate::error::CoreError;

/// A fully resolved list query: predicates (AND-ed), optional page window,
/// and ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub predicates: Vec<Predicate>,
    pub pagination: Option<Pagination>,
    pub ordering: Ordering,
}

impl ListQuery {
    /// Build the query for `schema` from raw filter input.
    pub fn from_bag(schema: &EntitySchema, bag: &FilterBag) -> Result<Self, CoreError> {
        let mut predicates = Vec::new();

        if let Some(raw) = bag.text("id") {
            predicates.push(Predicate::id_eq("id", &raw));
        }

        for column in schema.text_filters {
            if let Some(needle) = bag.text(column) {
                predicates.push(Predicate::contains(*column, &needle));
            }
        }

        for column in schema.range_filters {
            if let Some((start, end)) = bag.range(&format!("{column}Range")) {
                push_range(&mut predicates, *column, start, end)?;
            }
        }

        for reference in schema.reference_filters {
            if let Some(raw) = bag.text(reference.key) {
                predicates.push(Predicate::id_eq(reference.column, &raw));
            }
        }

        if let Some(active) = bag.flag("active") {
            predicates.push(Predicate::Eq {
                column: "active",
                value: FilterValue::Bool(active),
            });
        }

        for key in CREATED_AT_RANGE_KEYS {
            if let Some((start, end)) = bag.range(key) {
                push_range(&mut predicates, "created_at", start, end)?;
            }
        }

        Ok(Self {
            predicates,
            pagination: Pagination::from_bag(bag)?,
            ordering: Ordering::from_bag(schema, bag),
        })
    }
}

/// Predicate for an autocomplete lookup: the id equals `query` parsed as a
/// UUID, or the label contains it. `None` when the query is blank.
pub fn autocomplete_predicate(schema: &EntitySchema, query: &str) -> Option<Predicate> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    let mut alternatives = Vec::with_capacity(2);
    if let Ok(id) = query.parse() {
        alternatives.push(Predicate::Eq {
            column: "id",
            value: FilterValue::Id(id),
        });
    }
    alternatives.push(Predicate::contains(schema.label_column, query));
    Some(Predicate::Any(alternatives))
}

/// Each bound constrains independently; an open bound adds nothing.
fn push_range(
    predicates: &mut Vec<Predicate>,
    column: &'static str,
    start: Option<String>,
    end: Option<String>,
) -> Result<(), CoreError> {
    if let Some(raw) = start {
        predicates.push(Predicate::Gte {
            column,
            value: FilterValue::Timestamp(parse_timestamp(&raw)?),
        });
    }
    if let Some(raw) = end {
        predicates.push(Predicate::Lte {
            column,
            value: FilterValue::Timestamp(parse_timestamp(&raw)?),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    const ALERTS: EntitySchema = EntitySchema {
        entity: "Alert",
        table: "alerts",
        columns: "id, message, triggered_at",
        label_column: "message",
        text_filters: &["message"],
        range_filters: &["triggered_at"],
        reference_filters: &[ReferenceFilter {
            key: "pots",
            column: "pots_id",
        }],
        sortable: &["message", "triggered_at"],
    };

    fn jan_first() -> crate::types::Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn empty_bag_has_no_predicates_and_defaults() {
        let q = ListQuery::from_bag(&ALERTS, &FilterBag::new()).unwrap();
        assert!(q.predicates.is_empty());
        assert_eq!(q.pagination, None);
        assert_eq!(q.ordering, Ordering::default());
    }

    #[test]
    fn text_range_and_paging_from_example_filter() {
        let bag = FilterBag::from_json(json!({
            "message": "disk",
            "triggered_atRange": ["2024-01-01", null],
            "page": 0,
            "limit": 10,
        }));
        let q = ListQuery::from_bag(&ALERTS, &bag).unwrap();
        assert_eq!(
            q.predicates,
            vec![
                Predicate::Contains {
                    column: "message",
                    pattern: "%disk%".into()
                },
                Predicate::Gte {
                    column: "triggered_at",
                    value: FilterValue::Timestamp(jan_first())
                },
            ]
        );
        assert_eq!(q.pagination, Some(Pagination { limit: 10, offset: 0 }));
        assert_eq!(q.ordering, Ordering::default());
    }

    #[test]
    fn both_range_bounds_add_two_clauses_on_same_column() {
        let bag = FilterBag::from_pairs([
            ("createdAtRange", "2024-01-01"),
            ("createdAtRange", "2024-01-31"),
        ]);
        let q = ListQuery::from_bag(&ALERTS, &bag).unwrap();
        assert_eq!(q.predicates.len(), 2);
        assert_matches!(q.predicates[0], Predicate::Gte { column: "created_at", .. });
        assert_matches!(q.predicates[1], Predicate::Lte { column: "created_at", .. });
    }

    #[test]
    fn open_start_bound_only_adds_upper_clause() {
        let bag = FilterBag::from_json(json!({"triggered_atRange": ["", "2024-01-01"]}));
        let q = ListQuery::from_bag(&ALERTS, &bag).unwrap();
        assert_eq!(
            q.predicates,
            vec![Predicate::Lte {
                column: "triggered_at",
                value: FilterValue::Timestamp(jan_first())
            }]
        );
    }

    #[test]
    fn fully_open_range_adds_nothing() {
        let bag = FilterBag::from_json(json!({"triggered_atRange": [null, null]}));
        let q = ListQuery::from_bag(&ALERTS, &bag).unwrap();
        assert!(q.predicates.is_empty());
    }

    #[test]
    fn unparseable_range_bound_is_a_validation_error() {
        let bag = FilterBag::from_pairs([("triggered_atRange", "soon")]);
        assert_matches!(
            ListQuery::from_bag(&ALERTS, &bag),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn active_flag_coerces_non_true_strings_to_false() {
        let bag = FilterBag::from_pairs([("active", "yes")]);
        let q = ListQuery::from_bag(&ALERTS, &bag).unwrap();
        assert_eq!(
            q.predicates,
            vec![Predicate::Eq {
                column: "active",
                value: FilterValue::Bool(false)
            }]
        );
    }

    #[test]
    fn reference_filter_targets_fk_column() {
        let id = uuid::Uuid::new_v4();
        let bag = FilterBag::from_pairs([("pots", id.to_string())]);
        let q = ListQuery::from_bag(&ALERTS, &bag).unwrap();
        assert_eq!(
            q.predicates,
            vec![Predicate::Eq {
                column: "pots_id",
                value: FilterValue::Id(id)
            }]
        );
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let bag = FilterBag::from_pairs([("colour", "red"), ("countOnly", "true")]);
        let q = ListQuery::from_bag(&ALERTS, &bag).unwrap();
        assert!(q.predicates.is_empty());
    }

    #[test]
    fn autocomplete_with_uuid_matches_id_or_label() {
        let id = uuid::Uuid::new_v4();
        let p = autocomplete_predicate(&ALERTS, &id.to_string()).unwrap();
        assert_matches!(p, Predicate::Any(ref alts) if alts.len() == 2);
    }

    #[test]
    fn autocomplete_with_text_matches_label_only() {
        let p = autocomplete_predicate(&ALERTS, "disk").unwrap();
        assert_eq!(
            p,
            Predicate::Any(vec![Predicate::Contains {
                column: "message",
                pattern: "%disk%".into()
            }])
        );
    }

    #[test]
    fn autocomplete_blank_query_has_no_predicate() {
        assert_eq!(autocomplete_predicate(&ALERTS, "  "), None);
    }
}
