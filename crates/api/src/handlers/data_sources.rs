//! Handlers for data sources.
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
use potwatch_db::models::data_source::{CreateDataSource, UpdateDataSource};
use potwatch_db::repositories::{data_source_repo, DataSourceRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{AutocompleteParams, ListPairs, ListParams};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: data_source_repo::SCHEMA.entity,
        id,
    })
}

/// GET /api/v1/data-sources
///
/// Filtered list as `{ rows, count }`. With `countOnly=true`, `rows` is empty.
pub async fn list_data_sources(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(pairs): Query<ListPairs>,
) -> AppResult<impl IntoResponse> {
    let params = ListParams::parse(&data_source_repo::SCHEMA, pairs)?;
    let mut conn = state.pool.acquire().await?;
    let page = DataSourceRepo::list(&mut conn, &params.query, params.options)
        .await
        .map_err(AppError::ListQuery)?;

    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/data-sources/count
pub async fn count_data_sources(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(pairs): Query<ListPairs>,
) -> AppResult<impl IntoResponse> {
    let params = ListParams::parse(&data_source_repo::SCHEMA, pairs)?;
    let mut conn = state.pool.acquire().await?;
    let page = DataSourceRepo::list(&mut conn, &params.query, ListOptions::count_only())
        .await
        .map_err(AppError::ListQuery)?;

    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/data-sources/autocomplete
pub async fn autocomplete_data_sources(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<AutocompleteParams>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let items = DataSourceRepo::autocomplete(
        &mut conn,
        params.query.as_deref(),
        params.limit,
        params.offset,
    )
    .await?;

    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/data-sources/{id}
pub async fn get_data_source(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let source = DataSourceRepo::find_by_id(&mut conn, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(DataResponse { data: source }))
}

/// POST /api/v1/data-sources
pub async fn create_data_source(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateDataSource>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let source = DataSourceRepo::create(&mut conn, &input, auth.acting()).await?;

    tracing::info!(data_source_id = %source.id, user_id = %auth.user_id, "Data source created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: source })))
}

/// POST /api/v1/data-sources/bulk-import
pub async fn bulk_import_data_sources(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<Vec<CreateDataSource>>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let sources = DataSourceRepo::bulk_import(&mut conn, &input, auth.acting()).await?;

    tracing::info!(count = sources.len(), user_id = %auth.user_id, "Data sources imported");

    Ok((StatusCode::CREATED, Json(DataResponse { data: sources })))
}

/// PUT /api/v1/data-sources/{id}
///
/// Absent fields are left unchanged; `null` clears.
pub async fn update_data_source(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDataSource>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let source = DataSourceRepo::update(&mut conn, id, &input, auth.acting())
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(data_source_id = %id, user_id = %auth.user_id, "Data source updated");

    Ok(Json(DataResponse { data: source }))
}

/// DELETE /api/v1/data-sources/{id}
pub async fn delete_data_source(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    DataSourceRepo::remove(&mut conn, id, auth.acting())
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(data_source_id = %id, user_id = %auth.user_id, "Data source deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/data-sources/deleteByIds
///
/// All-or-nothing. Returns the rows that were removed.
pub async fn delete_data_sources_by_ids(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<DeleteByIds>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let deleted = DataSourceRepo::delete_by_ids(&mut conn, &input.ids, auth.acting()).await?;

    tracing::info!(count = deleted.len(), user_id = %auth.user_id, "Data sources deleted");

    Ok(Json(DataResponse { data: deleted }))
}
