//! Handlers for alerts.
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
use potwatch_db::models::alert::{CreateAlert, UpdateAlert};
use potwatch_db::models::common::DeleteByIds;
use potwatch_db::repositories::{alert_repo, AlertRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{AutocompleteParams, ListPairs, ListParams};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: alert_repo::SCHEMA.entity,
        id,
    })
}

/// GET /api/v1/alerts
///
/// Filtered list as `{ rows, count }`. With `countOnly=true`, `rows` is empty.
pub async fn list_alerts(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(pairs): Query<ListPairs>,
) -> AppResult<impl IntoResponse> {
    let params = ListParams::parse(&alert_repo::SCHEMA, pairs)?;
    let mut conn = state.pool.acquire().await?;
    let page = AlertRepo::list(&mut conn, &params.query, params.options)
        .await
        .map_err(AppError::ListQuery)?;

    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/alerts/count
pub async fn count_alerts(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(pairs): Query<ListPairs>,
) -> AppResult<impl IntoResponse> {
    let params = ListParams::parse(&alert_repo::SCHEMA, pairs)?;
    let mut conn = state.pool.acquire().await?;
    let page = AlertRepo::list(&mut conn, &params.query, ListOptions::count_only())
        .await
        .map_err(AppError::ListQuery)?;

    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/alerts/autocomplete
pub async fn autocomplete_alerts(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<AutocompleteParams>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let items = AlertRepo::autocomplete(
        &mut conn,
        params.query.as_deref(),
        params.limit,
        params.offset,
    )
    .await?;

    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/alerts/{id}
pub async fn get_alert(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let alert = AlertRepo::find_by_id(&mut conn, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(DataResponse { data: alert }))
}

/// POST /api/v1/alerts
pub async fn create_alert(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateAlert>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let alert = AlertRepo::create(&mut conn, &input, auth.acting()).await?;

    tracing::info!(alert_id = %alert.id, user_id = %auth.user_id, "Alert created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: alert })))
}

/// POST /api/v1/alerts/bulk-import
///
/// All rows are inserted in one transaction; `created_at` follows array order.
pub async fn bulk_import_alerts(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<Vec<CreateAlert>>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let alerts = AlertRepo::bulk_import(&mut conn, &input, auth.acting()).await?;

    tracing::info!(count = alerts.len(), user_id = %auth.user_id, "Alerts imported");

    Ok((StatusCode::CREATED, Json(DataResponse { data: alerts })))
}

/// PUT /api/v1/alerts/{id}
///
/// Absent fields are left unchanged; `null` clears.
pub async fn update_alert(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAlert>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let alert = AlertRepo::update(&mut conn, id, &input, auth.acting())
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(alert_id = %id, user_id = %auth.user_id, "Alert updated");

    Ok(Json(DataResponse { data: alert }))
}

/// DELETE /api/v1/alerts/{id}
pub async fn delete_alert(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    AlertRepo::remove(&mut conn, id, auth.acting())
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(alert_id = %id, user_id = %auth.user_id, "Alert deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/alerts/deleteByIds
///
/// All-or-nothing. Returns the rows that were removed.
pub async fn delete_alerts_by_ids(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<DeleteByIds>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let deleted = AlertRepo::delete_by_ids(&mut conn, &input.ids, auth.acting()).await?;

    tracing::info!(count = deleted.len(), user_id = %auth.user_id, "Alerts deleted");

    Ok(Json(DataResponse { data: deleted }))
}
