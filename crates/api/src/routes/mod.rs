pub mod alerts;
pub mod anomalies;
pub mod data_sources;
pub mod health;
pub mod pots;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /alerts          alerts CRUD, list, count, autocomplete
/// /anomalies       anomalies CRUD, list, count, autocomplete
/// /data-sources    data sources CRUD, list, count, autocomplete
/// /pots            pots CRUD, list, count, autocomplete
/// ```
///
/// Every route requires a Bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/alerts", alerts::router())
        .nest("/anomalies", anomalies::router())
        .nest("/data-sources", data_sources::router())
        .nest("/pots", pots::router())
}
