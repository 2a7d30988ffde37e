//! Static descriptions of filterable entity tables.
//!
//! Column names in a schema are the only identifiers ever interpolated into
//! SQL; every user-supplied value travels as a bind parameter.

/// An exact-match filter on a foreign-key column, keyed by its form name
/// (e.g. `data_source` filters `data_source_id`).
#[derive(Debug, Clone, Copy)]
pub struct ReferenceFilter {
    pub key: &'static str,
    pub column: &'static str,
}

/// Everything the list/autocomplete builder needs to know about a table.
#[derive(Debug, Clone, Copy)]
pub struct EntitySchema {
    /// Human-readable entity name used in `NotFound` errors.
    pub entity: &'static str,
    pub table: &'static str,
    /// Comma-separated SELECT column list.
    pub columns: &'static str,
    /// Column shown as the autocomplete label.
    pub label_column: &'static str,
    /// Columns matched case-insensitively by substring.
    pub text_filters: &'static [&'static str],
    /// Timestamp columns filtered by a `<column>Range` pair.
    pub range_filters: &'static [&'static str],
    pub reference_filters: &'static [ReferenceFilter],
    /// Entity-specific sortable columns; the common columns are always
    /// sortable.
    pub sortable: &'static [&'static str],
}

/// Columns every entity table carries and can be sorted by.
pub const COMMON_SORTABLE: &[&str] = &["id", "active", "created_at", "updated_at"];

/// Filter key for the creation-time range shared by every entity.
pub const CREATED_AT_RANGE_KEYS: &[&str] = &["created_atRange", "createdAtRange"];

impl EntitySchema {
    /// Resolve a client-supplied sort field to a whitelisted column.
    ///
    /// Accepts the camelCase aliases `createdAt` / `updatedAt`.
    pub fn sort_column(&self, field: &str) -> Option<&'static str> {
        let field = match field {
            "createdAt" => "created_at",
            "updatedAt" => "updated_at",
            other => other,
        };
        COMMON_SORTABLE
            .iter()
            .chain(self.sortable.iter())
            .find(|c| **c == field)
            .copied()
    }
}
