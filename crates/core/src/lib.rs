//! Domain building blocks shared by the persistence and HTTP layers.
//!
//! Nothing in this crate performs I/O: it turns loosely-typed filter input
//! into typed predicates, defines the error taxonomy, and holds the small
//! policies (pagination, ordering, import staggering) every entity shares.

pub mod context;
pub mod error;
pub mod filter;
pub mod import;
pub mod patch;
pub mod types;
