//! Handlers for pots.
//!
//! Lists accept the loosely-typed filter bag as query pairs; mutations stamp
//! the authenticated user into the audit columns. All endpoints require
//! [`AuthUser`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use potwatch_core::context::ListOptions;
use potwatch_core::error::CoreError;
use potwatch_core::types::DbId;
use potwatch_db::models::common::DeleteByIds;
use potwatch_db::models::pot::{CreatePot, UpdatePot};
use potwatch_db::repositories::{pot_repo, PotRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{AutocompleteParams, ListPairs, ListParams};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: pot_repo::SCHEMA.entity,
        id,
    })
}

/// GET /api/v1/pots
///
/// Filtered list as `{ rows, count }`. With `countOnly=true`, `rows` is empty.
pub async fn list_pots(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(pairs): Query<ListPairs>,
) -> AppResult<impl IntoResponse> {
    let params = ListParams::parse(&pot_repo::SCHEMA, pairs)?;
    let mut conn = state.pool.acquire().await?;
    let page = PotRepo::list(&mut conn, &params.query, params.options)
        .await
        .map_err(AppError::ListQuery)?;

    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/pots/count
pub async fn count_pots(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(pairs): Query<ListPairs>,
) -> AppResult<impl IntoResponse> {
    let params = ListParams::parse(&pot_repo::SCHEMA, pairs)?;
    let mut conn = state.pool.acquire().await?;
    let page = PotRepo::list(&mut conn, &params.query, ListOptions::count_only())
        .await
        .map_err(AppError::ListQuery)?;

    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/pots/autocomplete
pub async fn autocomplete_pots(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<AutocompleteParams>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let items = PotRepo::autocomplete(
        &mut conn,
        params.query.as_deref(),
        params.limit,
        params.offset,
    )
    .await?;

    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/pots/{id}
pub async fn get_pot(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let pot = PotRepo::find_by_id(&mut conn, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(DataResponse { data: pot }))
}

/// POST /api/v1/pots
pub async fn create_pot(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePot>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let pot = PotRepo::create(&mut conn, &input, auth.acting()).await?;

    tracing::info!(pot_id = %pot.id, user_id = %auth.user_id, "Pot created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: pot })))
}

/// POST /api/v1/pots/bulk-import
///
/// All rows are inserted in one transaction; `created_at` follows array order.
pub async fn bulk_import_pots(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<Vec<CreatePot>>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let pots = PotRepo::bulk_import(&mut conn, &input, auth.acting()).await?;

    tracing::info!(count = pots.len(), user_id = %auth.user_id, "Pots imported");

    Ok((StatusCode::CREATED, Json(DataResponse { data: pots })))
}

/// PUT /api/v1/pots/{id}
///
/// Absent fields are left unchanged; `null` clears.
pub async fn update_pot(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePot>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let pot = PotRepo::update(&mut conn, id, &input, auth.acting())
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(pot_id = %id, user_id = %auth.user_id, "Pot updated");

    Ok(Json(DataResponse { data: pot }))
}

/// DELETE /api/v1/pots/{id}
pub async fn delete_pot(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    PotRepo::remove(&mut conn, id, auth.acting())
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(pot_id = %id, user_id = %auth.user_id, "Pot deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/pots/deleteByIds
///
/// All-or-nothing. References from data sources and anomalies are cleared.
pub async fn delete_pots_by_ids(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<DeleteByIds>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let deleted = PotRepo::delete_by_ids(&mut conn, &input.ids, auth.acting()).await?;

    tracing::info!(count = deleted.len(), user_id = %auth.user_id, "Pots deleted");

    Ok(Json(DataResponse { data: deleted }))
}
