//! Route definitions for alerts.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::alerts;
use crate::state::AppState;

/// Routes mounted at `/alerts`.
///
/// ```text
/// GET    /                  -> list_alerts
/// POST   /                  -> create_alert
/// GET    /count             -> count_alerts
/// GET    /autocomplete      -> autocomplete_alerts
/// POST   /bulk-import       -> bulk_import_alerts
/// POST   /deleteByIds       -> delete_alerts_by_ids
/// GET    /{id}              -> get_alert
/// PUT    /{id}              -> update_alert
/// DELETE /{id}              -> delete_alert
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alerts::list_alerts).post(alerts::create_alert))
        .route("/count", get(alerts::count_alerts))
        .route("/autocomplete", get(alerts::autocomplete_alerts))
        .route("/bulk-import", post(alerts::bulk_import_alerts))
        .route("/deleteByIds", post(alerts::delete_alerts_by_ids))
        .route(
            "/{id}",
            get(alerts::get_alert)
                .put(alerts::update_alert)
                .delete(alerts::delete_alert),
        )
}
