//! Pagination and ordering policy for list queries.

use super::bag::FilterBag;
use super::schema::EntitySchema;
use crate::error::CoreError;

/// LIMIT/OFFSET for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    /// Resolve `limit` and `page` from the filter bag.
    ///
    /// `offset = page * limit`. A zero or absent `limit` disables pagination
    /// and returns `None`: every matching row is returned.
    pub fn from_bag(bag: &FilterBag) -> Result<Option<Self>, CoreError> {
        let limit = bag.integer("limit")?.unwrap_or(0);
        if limit == 0 {
            return Ok(None);
        }
        let page = bag.integer("page")?.unwrap_or(0);
        let offset = page
            .checked_mul(limit)
            .ok_or_else(|| CoreError::Validation("page is out of range".into()))?;
        Ok(Some(Self { limit, offset }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// ORDER BY clause for a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub column: &'static str,
    pub direction: SortDirection,
}

impl Default for Ordering {
    /// Newest first.
    fn default() -> Self {
        Self {
            column: "created_at",
            direction: SortDirection::Desc,
        }
    }
}

impl Ordering {
    /// Use `field` + `sort` when both are present and recognised; otherwise
    /// the default `created_at DESC`.
    pub fn from_bag(schema: &EntitySchema, bag: &FilterBag) -> Self {
        let (Some(field), Some(sort)) = (bag.text("field"), bag.text("sort")) else {
            return Self::default();
        };
        match (schema.sort_column(&field), SortDirection::parse(&sort)) {
            (Some(column), Some(direction)) => Self { column, direction },
            _ => Self::default(),
        }
    }
}
