pub mod alerts;
pub mod anomalies;
pub mod data_sources;
pub mod pots;
