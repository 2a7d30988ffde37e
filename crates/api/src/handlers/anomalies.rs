//! Handlers for anomalies.
//!
//! Supports the `detected_atRange`, `data_source` and `pots` filters on
//! top of the shared ones. All endpoints require [`AuthUser`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use potwatch_core::context::ListOptions;
use potwatch_core::error::CoreError;
use potwatch_core::types::DbId;
use potwatch_db::models::anomaly::{CreateAnomaly, UpdateAnomaly};
use potwatch_db::models::common::DeleteByIds;
use potwatch_db::repositories::{anomaly_repo, AnomalyRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{AutocompleteParams, ListPairs, ListParams};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: anomaly_repo::SCHEMA.entity,
        id,
    })
}

/// GET /api/v1/anomalies
///
/// Filtered list as `{ rows, count }`. With `countOnly=true`, `rows` is empty.
pub async fn list_anomalies(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(pairs): Query<ListPairs>,
) -> AppResult<impl IntoResponse> {
    let params = ListParams::parse(&anomaly_repo::SCHEMA, pairs)?;
    let mut conn = state.pool.acquire().await?;
    let page = AnomalyRepo::list(&mut conn, &params.query, params.options)
        .await
        .map_err(AppError::ListQuery)?;

    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/anomalies/count
pub async fn count_anomalies(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(pairs): Query<ListPairs>,
) -> AppResult<impl IntoResponse> {
    let params = ListParams::parse(&anomaly_repo::SCHEMA, pairs)?;
    let mut conn = state.pool.acquire().await?;
    let page = AnomalyRepo::list(&mut conn, &params.query, ListOptions::count_only())
        .await
        .map_err(AppError::ListQuery)?;

    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/anomalies/autocomplete
pub async fn autocomplete_anomalies(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<AutocompleteParams>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let items = AnomalyRepo::autocomplete(
        &mut conn,
        params.query.as_deref(),
        params.limit,
        params.offset,
    )
    .await?;

    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/anomalies/{id}
pub async fn get_anomaly(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let anomaly = AnomalyRepo::find_by_id(&mut conn, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(DataResponse { data: anomaly }))
}

/// POST /api/v1/anomalies
pub async fn create_anomaly(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateAnomaly>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let anomaly = AnomalyRepo::create(&mut conn, &input, auth.acting()).await?;

    tracing::info!(anomaly_id = %anomaly.id, user_id = %auth.user_id, "Anomaly created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: anomaly })))
}

/// POST /api/v1/anomalies/bulk-import
///
/// All rows are inserted in one transaction; `created_at` follows array order.
pub async fn bulk_import_anomalies(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<Vec<CreateAnomaly>>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let anomalies = AnomalyRepo::bulk_import(&mut conn, &input, auth.acting()).await?;

    tracing::info!(count = anomalies.len(), user_id = %auth.user_id, "Anomalies imported");

    Ok((StatusCode::CREATED, Json(DataResponse { data: anomalies })))
}

/// PUT /api/v1/anomalies/{id}
///
/// Absent fields are left unchanged; `null` clears.
pub async fn update_anomaly(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAnomaly>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let anomaly = AnomalyRepo::update(&mut conn, id, &input, auth.acting())
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(anomaly_id = %id, user_id = %auth.user_id, "Anomaly updated");

    Ok(Json(DataResponse { data: anomaly }))
}

/// DELETE /api/v1/anomalies/{id}
pub async fn delete_anomaly(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    AnomalyRepo::remove(&mut conn, id, auth.acting())
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(anomaly_id = %id, user_id = %auth.user_id, "Anomaly deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/anomalies/deleteByIds
///
/// All-or-nothing. Returns the rows that were removed.
pub async fn delete_anomalies_by_ids(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<DeleteByIds>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let deleted = AnomalyRepo::delete_by_ids(&mut conn, &input.ids, auth.acting()).await?;

    tracing::info!(count = deleted.len(), user_id = %auth.user_id, "Anomalies deleted");

    Ok(Json(DataResponse { data: deleted }))
}
