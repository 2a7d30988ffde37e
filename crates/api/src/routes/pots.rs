//! Route definitions for pots.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::pots;
use crate::state::AppState;

/// Routes mounted at `/pots`.
///
/// ```text
/// GET    /                  -> list_pots
/// POST   /                  -> create_pot
/// GET    /count             -> count_pots
/// GET    /autocomplete      -> autocomplete_pots
/// POST   /bulk-import       -> bulk_import_pots
/// POST   /deleteByIds       -> delete_pots_by_ids
/// GET    /{id}              -> get_pot
/// PUT    /{id}              -> update_pot
/// DELETE /{id}              -> delete_pot
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pots::list_pots).post(pots::create_pot))
        .route("/count", get(pots::count_pots))
        .route("/autocomplete", get(pots::autocomplete_pots))
        .route("/bulk-import", post(pots::bulk_import_pots))
        .route("/deleteByIds", post(pots::delete_pots_by_ids))
        .route(
            "/{id}",
            get(pots::get_pot)
                .put(pots::update_pot)
                .delete(pots::delete_pot),
        )
}
