//! HTTP-level integration tests for the alerts endpoints.
//!
//! Uses `tower::ServiceExt` to send requests directly to the router without a
//! TCP listener.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, put_json, TEST_USER};
use serde_json::json;
use sqlx::PgPool;

async fn import(pool: &PgPool, body: serde_json::Value) -> Vec<serde_json::Value> {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/alerts/bulk-import", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

fn messages(json: &serde_json::Value) -> Vec<String> {
    json["data"]["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["message"].as_str().unwrap_or_default().to_string())
        .collect()
}

async fn seed(pool: &PgPool) -> Vec<serde_json::Value> {
    import(
        pool,
        json!([
            { "message": "disk slow",  "triggered_at": "2023-12-01T00:00:00Z" },
            { "message": "Disk full",  "triggered_at": "2024-01-05T00:00:00Z" },
            { "message": "cpu hot",    "triggered_at": "2024-02-01T00:00:00Z" },
            { "message": "DISK error", "triggered_at": "2024-03-01T00:00:00Z" },
        ]),
    )
    .await
}

// ---------------------------------------------------------------------------
// Create / read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_returns_201_and_stamps_the_caller(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/alerts", json!({ "message": "disk full" })).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["message"], "disk full");
    assert_eq!(json["data"]["active"], true);
    assert_eq!(json["data"]["created_by_id"], TEST_USER.to_string());
    assert!(json["data"]["id"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn get_by_id_and_missing_id(pool: PgPool) {
    let created = seed(&pool).await;
    let id = created[0]["id"].as_str().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/alerts/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["message"], "disk slow");

    let app = common::build_test_app(pool.clone());
    let missing = uuid::Uuid::new_v4();
    let response = get(app, &format!("/api/v1/alerts/{missing}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/alerts/not-a-uuid").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_import_hash_returns_409(pool: PgPool) {
    let body = json!({ "message": "once", "import_hash": "abc" });

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/alerts", body.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/alerts", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn list_filters_by_text_and_open_range(pool: PgPool) {
    seed(&pool).await;

    let app = common::build_test_app(pool);
    let response = get(
        app,
        "/api/v1/alerts?message=disk\
         &triggered_atRange=2024-01-01&triggered_atRange=\
         &page=0&limit=10",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(messages(&json), vec!["DISK error", "Disk full"]);
    assert_eq!(json["data"]["count"], 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_pages_and_counts_total(pool: PgPool) {
    seed(&pool).await;

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/alerts?limit=3&page=1").await;

    let json = body_json(response).await;
    assert_eq!(messages(&json), vec!["disk slow"]);
    assert_eq!(json["data"]["count"], 4);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn count_only_returns_empty_rows(pool: PgPool) {
    seed(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/alerts?message=disk&countOnly=true&limit=1").await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["rows"], json!([]));
    assert_eq!(json["data"]["count"], 3);

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/alerts/count?message=disk").await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["rows"], json!([]));
    assert_eq!(json["data"]["count"], 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn malformed_range_bound_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/alerts?triggered_atRange=yesterday").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn bulk_import_keeps_array_order_by_creation_time(pool: PgPool) {
    seed(&pool).await;

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/alerts?field=createdAt&sort=asc").await;

    let json = body_json(response).await;
    assert_eq!(
        messages(&json),
        vec!["disk slow", "Disk full", "cpu hot", "DISK error"]
    );
}

// ---------------------------------------------------------------------------
// Autocomplete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn autocomplete_returns_id_label_pairs(pool: PgPool) {
    let created = seed(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/alerts/autocomplete?query=disk&limit=2").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["label"], "DISK error");
    assert!(items[0]["id"].is_string());

    let id = created[2]["id"].as_str().unwrap();
    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/alerts/autocomplete?query={id}")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"], json!([{ "id": id, "label": "cpu hot" }]));
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn put_distinguishes_absent_and_null(pool: PgPool) {
    let created = seed(&pool).await;
    let id = created[1]["id"].as_str().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/alerts/{id}"),
        json!({ "triggered_at": null }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["message"], "Disk full");
    assert_eq!(json["data"]["triggered_at"], serde_json::Value::Null);
    assert_eq!(json["data"]["updated_by_id"], TEST_USER.to_string());

    let app = common::build_test_app(pool);
    let response = put_json(app, &format!("/api/v1/alerts/{id}"), json!({ "active": false })).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["message"], "Disk full");
    assert_eq!(json["data"]["active"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn put_on_missing_id_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let missing = uuid::Uuid::new_v4();
    let response = put_json(
        app,
        &format!("/api/v1/alerts/{missing}"),
        json!({ "message": "x" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_returns_204_then_404(pool: PgPool) {
    let created = seed(&pool).await;
    let id = created[0]["id"].as_str().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/alerts/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/alerts/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let logged: Option<uuid::Uuid> =
        sqlx::query_scalar("SELECT deleted_by FROM deletion_log WHERE record_id = $1::uuid")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(logged, Some(TEST_USER));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_by_ids_returns_removed_rows(pool: PgPool) {
    let created = seed(&pool).await;
    let ids = json!([created[0]["id"], created[3]["id"]]);

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/alerts/deleteByIds", json!({ "ids": ids })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let deleted = json["data"].as_array().unwrap();
    assert_eq!(deleted.len(), 2);
    assert!(deleted
        .iter()
        .all(|row| row["deleted_by"] == TEST_USER.to_string()));

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/alerts/count").await;
    assert_eq!(body_json(response).await["data"]["count"], 2);
}
