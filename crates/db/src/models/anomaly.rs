//! Anomaly model.

use potwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `anomalies` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Anomaly {
    pub id: DbId,
    pub description: Option<String>,
    pub detected_at: Option<Timestamp>,
    pub data_source_id: Option<DbId>,
    pub pots_id: Option<DbId>,
    pub active: bool,
    pub import_hash: Option<String>,
    pub created_by_id: Option<DbId>,
    pub updated_by_id: Option<DbId>,
    pub deleted_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating (or bulk-importing) an anomaly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAnomaly {
    pub id: Option<DbId>,
    pub description: Option<String>,
    pub detected_at: Option<Timestamp>,
    #[serde(alias = "data_source")]
    pub data_source_id: Option<DbId>,
    #[serde(alias = "pots")]
    pub pots_id: Option<DbId>,
    pub active: Option<bool>,
    pub import_hash: Option<String>,
}

/// DTO for partially updating an anomaly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAnomaly {
    #[serde(default, deserialize_with = "potwatch_core::patch::present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "potwatch_core::patch::present")]
    pub detected_at: Option<Option<Timestamp>>,
    #[serde(
        default,
        alias = "data_source",
        deserialize_with = "potwatch_core::patch::present"
    )]
    pub data_source_id: Option<Option<DbId>>,
    #[serde(default, alias = "pots", deserialize_with = "potwatch_core::patch::present")]
    pub pots_id: Option<Option<DbId>>,
    pub active: Option<bool>,
}
