//! Shared response envelope types for API handlers.
//!
//! Every successful body is wrapped as `{ "data": ... }`. Use
//! [`DataResponse`] rather than ad-hoc `serde_json::json!({ "data": ... })`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
