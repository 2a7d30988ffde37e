//! Route definitions for anomalies.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::anomalies;
use crate::state::AppState;

/// Routes mounted at `/anomalies`.
///
/// ```text
/// GET    /                  -> list_anomalies
/// POST   /                  -> create_anomaly
/// GET    /count             -> count_anomalies
/// GET    /autocomplete      -> autocomplete_anomalies
/// POST   /bulk-import       -> bulk_import_anomalies
/// POST   /deleteByIds       -> delete_anomalies_by_ids
/// GET    /{id}              -> get_anomaly
/// PUT    /{id}              -> update_anomaly
/// DELETE /{id}              -> delete_anomaly
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(anomalies::list_anomalies).post(anomalies::create_anomaly))
        .route("/count", get(anomalies::count_anomalies))
        .route("/autocomplete", get(anomalies::autocomplete_anomalies))
        .route("/bulk-import", post(anomalies::bulk_import_anomalies))
        .route("/deleteByIds", post(anomalies::delete_anomalies_by_ids))
        .route(
            "/{id}",
            get(anomalies::get_anomaly)
                .put(anomalies::update_anomaly)
                .delete(anomalies::delete_anomaly),
        )
}
