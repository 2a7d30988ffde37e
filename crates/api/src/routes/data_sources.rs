//! Route definitions for data sources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::data_sources;
use crate::state::AppState;

/// Routes mounted at `/data-sources`.
///
/// ```text
/// GET    /                  -> list_data_sources
/// POST   /                  -> create_data_source
/// GET    /count             -> count_data_sources
/// GET    /autocomplete      -> autocomplete_data_sources
/// POST   /bulk-import       -> bulk_import_data_sources
/// POST   /deleteByIds       -> delete_data_sources_by_ids
/// GET    /{id}              -> get_data_source
/// PUT    /{id}              -> update_data_source
/// DELETE /{id}              -> delete_data_source
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(data_sources::list_data_sources).post(data_sources::create_data_source))
        .route("/count", get(data_sources::count_data_sources))
        .route("/autocomplete", get(data_sources::autocomplete_data_sources))
        .route("/bulk-import", post(data_sources::bulk_import_data_sources))
        .route("/deleteByIds", post(data_sources::delete_data_sources_by_ids))
        .route(
            "/{id}",
            get(data_sources::get_data_source)
                .put(data_sources::update_data_source)
                .delete(data_sources::delete_data_source),
        )
}
