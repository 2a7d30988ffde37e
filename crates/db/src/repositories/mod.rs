//! Repository layer: one zero-sized struct per table.
//!
//! Every method takes `&mut PgConnection`, so callers decide whether it runs
//! on a pooled connection or inside an outer transaction.

pub mod alert_repo;
pub mod anomaly_repo;
pub mod data_source_repo;
pub mod pot_repo;

pub use alert_repo::AlertRepo;
pub use anomaly_repo::AnomalyRepo;
pub use data_source_repo::DataSourceRepo;
pub use pot_repo::PotRepo;
