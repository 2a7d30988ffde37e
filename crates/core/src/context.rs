//! Typed per-call context for repository operations.
//!
//! The transaction handle is not part of these structs: every repository
//! method takes the connection (`&mut PgConnection`, either pooled or
//! `&mut *tx`) as its first argument.

use crate::types::DbId;

/// The user performing a mutation. Stamped into `created_by_id`,
/// `updated_by_id` and `deleted_by`; never taken from request bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActingUser {
    pub id: Option<DbId>,
}

impl ActingUser {
    pub fn new(id: DbId) -> Self {
        Self { id: Some(id) }
    }

    /// A mutation with no authenticated actor (seed scripts, tests).
    pub fn system() -> Self {
        Self { id: None }
    }
}

/// Options for filtered list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Compute only the total; `rows` comes back empty and no limit/offset
    /// is applied.
    pub count_only: bool,
}

impl ListOptions {
    pub fn count_only() -> Self {
        Self { count_only: true }
    }
}
