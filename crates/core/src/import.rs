//! Bulk import helpers.

use chrono::Duration;

use crate::types::Timestamp;

/// Seconds between consecutive `created_at` values in one bulk import.
pub const IMPORT_STAGGER_SECS: i64 = 1;

/// `created_at` for the record at `index` of a bulk import.
///
/// Records inserted in one statement would otherwise share a timestamp;
/// staggering keeps `ORDER BY created_at` equal to input order.
pub fn staggered_created_at(base: Timestamp, index: usize) -> Timestamp {
    base + Duration::seconds(index as i64 * IMPORT_STAGGER_SECS)
}
