//! HTTP-level tests for pots, data sources and anomalies, covering the
//! reference filters that link them.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, put_json};
use serde_json::json;
use sqlx::PgPool;

async fn create(pool: &PgPool, path: &str, body: serde_json::Value) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, path, body).await;
    assert_eq!(response.status(), StatusCode::CREATED, "POST {path}");
    body_json(response).await["data"].clone()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn data_sources_filter_by_pot_reference(pool: PgPool) {
    let basil = create(&pool, "/api/v1/pots", json!({ "name": "basil" })).await;
    let mint = create(&pool, "/api/v1/pots", json!({ "name": "mint" })).await;
    let basil_id = basil["id"].as_str().unwrap();

    create(
        &pool,
        "/api/v1/data-sources",
        json!({ "url": "http://basil/moisture", "pot": basil_id }),
    )
    .await;
    create(
        &pool,
        "/api/v1/data-sources",
        json!({ "url": "http://mint/moisture", "pot_id": mint["id"] }),
    )
    .await;

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/data-sources?pot={basil_id}")).await;
    let json = body_json(response).await;

    assert_eq!(json["data"]["count"], 1);
    assert_eq!(json["data"]["rows"][0]["url"], "http://basil/moisture");
    assert_eq!(json["data"]["rows"][0]["pot_id"], basil_id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn anomalies_filter_by_detected_range_and_source(pool: PgPool) {
    let source = create(&pool, "/api/v1/data-sources", json!({ "url": "http://feed" })).await;
    let source_id = source["id"].as_str().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/anomalies/bulk-import",
        json!([
            {
                "description": "spike",
                "detected_at": "2024-05-01T08:00:00Z",
                "data_source": source_id,
            },
            {
                "description": "dip",
                "detected_at": "2024-05-03T08:00:00Z",
                "data_source": source_id,
            },
            { "description": "spike", "detected_at": "2024-05-02T08:00:00Z" },
        ]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = get(
        app,
        &format!(
            "/api/v1/anomalies?data_source={source_id}\
             &detected_atRange=2024-05-01T00:00\
             &detected_atRange=2024-05-02\
             &field=detected_at&sort=asc"
        ),
    )
    .await;
    let json = body_json(response).await;

    assert_eq!(json["data"]["count"], 1);
    assert_eq!(json["data"]["rows"][0]["description"], "spike");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deleting_a_pot_clears_data_source_reference(pool: PgPool) {
    let pot = create(&pool, "/api/v1/pots", json!({ "name": "fern" })).await;
    let pot_id = pot["id"].as_str().unwrap();
    let source = create(
        &pool,
        "/api/v1/data-sources",
        json!({ "url": "http://fern", "pots": pot_id }),
    )
    .await;
    let source_id = source["id"].as_str().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/pots/{pot_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/data-sources/{source_id}")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["pots_id"], serde_json::Value::Null);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reference_to_missing_pot_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/data-sources",
        json!({ "url": "http://orphan", "pot": uuid::Uuid::new_v4() }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn pot_rename_and_autocomplete(pool: PgPool) {
    let pot = create(&pool, "/api/v1/pots", json!({ "name": "rosemary" })).await;
    let pot_id = pot["id"].as_str().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/pots/{pot_id}"),
        json!({ "name": "thyme" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/pots/autocomplete?query=THY").await;
    let json = body_json(response).await;
    assert_eq!(json["data"], json!([{ "id": pot_id, "label": "thyme" }]));
}
