//! Domain model structs and DTOs.
//!
//! Each entity submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts and bulk imports
//! - A `Deserialize` update DTO where `Option<Option<T>>` fields tell an
//!   absent field (leave unchanged) apart from an explicit `null` (clear)

pub mod alert;
pub mod anomaly;
pub mod common;
pub mod data_source;
pub mod pot;
