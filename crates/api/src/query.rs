//! Shared query parameter types for API handlers.

use potwatch_core::context::ListOptions;
use potwatch_core::filter::{EntitySchema, FilterBag, ListQuery};
use serde::Deserialize;

use crate::error::AppResult;

/// Raw `key=value` pairs of a list request.
///
/// Kept as pairs (not a struct) so that repeated keys such as
/// `triggered_atRange=2024-01-01&triggered_atRange=` survive as a range.
pub type ListPairs = Vec<(String, String)>;

/// A list request resolved against one entity.
#[derive(Debug)]
pub struct ListParams {
    pub query: ListQuery,
    pub options: ListOptions,
}

impl ListParams {
    /// Parse the filter bag for `schema`. `countOnly=true` switches to
    /// count-only mode.
    pub fn parse(schema: &EntitySchema, pairs: ListPairs) -> AppResult<Self> {
        let bag = FilterBag::from_pairs(pairs);
        let query = ListQuery::from_bag(schema, &bag)?;
        let options = ListOptions {
            count_only: bag.flag("countOnly").unwrap_or(false),
        };
        Ok(Self { query, options })
    }
}

/// `?query=&limit=&offset=` for autocomplete endpoints.
#[derive(Debug, Deserialize)]
pub struct AutocompleteParams {
    pub query: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use potwatch_core::filter::{EntitySchema, Predicate};

    use crate::error::AppError;

    const SCHEMA: EntitySchema = EntitySchema {
        entity: "Pot",
        table: "pots",
        columns: "id, name",
        label_column: "name",
        text_filters: &["name"],
        range_filters: &[],
        reference_filters: &[],
        sortable: &["name"],
    };

    fn pairs(raw: &[(&str, &str)]) -> ListPairs {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn count_only_flag_is_read_from_the_query_string() {
        let params = ListParams::parse(&SCHEMA, pairs(&[("countOnly", "true")])).unwrap();
        assert!(params.options.count_only);

        let params = ListParams::parse(&SCHEMA, pairs(&[("countOnly", "1")])).unwrap();
        assert!(!params.options.count_only);
    }

    #[test]
    fn filters_become_predicates() {
        let params = ListParams::parse(&SCHEMA, pairs(&[("name", "basil")])).unwrap();
        assert_matches!(
            params.query.predicates.as_slice(),
            [Predicate::Contains { column: "name", .. }]
        );
    }

    #[test]
    fn malformed_limit_is_a_validation_error() {
        let result = ListParams::parse(&SCHEMA, pairs(&[("limit", "ten")]));
        assert_matches!(result, Err(AppError::Core(_)));
    }
}
