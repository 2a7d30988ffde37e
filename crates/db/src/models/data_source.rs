//! Data source model.

use potwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `data_sources` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DataSource {
    pub id: DbId,
    pub url: Option<String>,
    pub description: Option<String>,
    pub pot_id: Option<DbId>,
    pub pots_id: Option<DbId>,
    pub active: bool,
    pub import_hash: Option<String>,
    pub created_by_id: Option<DbId>,
    pub updated_by_id: Option<DbId>,
    pub deleted_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating (or bulk-importing) a data source.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateDataSource {
    pub id: Option<DbId>,
    pub url: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "pot")]
    pub pot_id: Option<DbId>,
    #[serde(alias = "pots")]
    pub pots_id: Option<DbId>,
    pub active: Option<bool>,
    pub import_hash: Option<String>,
}

/// DTO for partially updating a data source.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDataSource {
    #[serde(default, deserialize_with = "potwatch_core::patch::present")]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "potwatch_core::patch::present")]
    pub description: Option<Option<String>>,
    #[serde(default, alias = "pot", deserialize_with = "potwatch_core::patch::present")]
    pub pot_id: Option<Option<DbId>>,
    #[serde(default, alias = "pots", deserialize_with = "potwatch_core::patch::present")]
    pub pots_id: Option<Option<DbId>>,
    pub active: Option<bool>,
}
