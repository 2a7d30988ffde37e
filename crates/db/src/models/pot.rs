//! Pot model.

use potwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `pots` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Pot {
    pub id: DbId,
    pub name: Option<String>,
    pub active: bool,
    pub import_hash: Option<String>,
    pub created_by_id: Option<DbId>,
    pub updated_by_id: Option<DbId>,
    pub deleted_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating (or bulk-importing) a pot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePot {
    pub id: Option<DbId>,
    pub name: Option<String>,
    pub active: Option<bool>,
    pub import_hash: Option<String>,
}

/// DTO for partially updating a pot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePot {
    #[serde(default, deserialize_with = "potwatch_core::patch::present")]
    pub name: Option<Option<String>>,
    pub active: Option<bool>,
}
