//! Alert model.

use potwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `alerts` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Alert {
    pub id: DbId,
    pub message: Option<String>,
    pub triggered_at: Option<Timestamp>,
    pub active: bool,
    pub import_hash: Option<String>,
    pub created_by_id: Option<DbId>,
    pub updated_by_id: Option<DbId>,
    pub deleted_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating (or bulk-importing) an alert.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAlert {
    pub id: Option<DbId>,
    pub message: Option<String>,
    pub triggered_at: Option<Timestamp>,
    pub active: Option<bool>,
    pub import_hash: Option<String>,
}

/// DTO for partially updating an alert.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAlert {
    #[serde(default, deserialize_with = "potwatch_core::patch::present")]
    pub message: Option<Option<String>>,
    #[serde(default, deserialize_with = "potwatch_core::patch::present")]
    pub triggered_at: Option<Option<Timestamp>>,
    pub active: Option<bool>,
}
