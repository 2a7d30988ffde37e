//! Shapes shared by every entity.

use potwatch_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One page of a filtered list plus the total number of matches.
#[derive(Debug, Clone, Serialize)]
pub struct ListPage<T> {
    pub rows: Vec<T>,
    pub count: i64,
}

/// An autocomplete suggestion.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AutocompleteItem {
    pub id: DbId,
    pub label: Option<String>,
}

/// Request body for bulk deletion.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteByIds {
    pub ids: Vec<DbId>,
}
