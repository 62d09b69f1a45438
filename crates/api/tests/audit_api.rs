//! HTTP-level integration tests for session recording and the audit console.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json, user_with_token, ROLE_STAFF, ROLE_USER};
use serde_json::json;
use sqlx::PgPool;

async fn record(pool: &PgPool, body: serde_json::Value) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/audit/conn", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_record_connection_accepts_relay_payload(pool: PgPool) {
    let (user, _) = user_with_token(&pool, "tech", ROLE_USER).await;

    let audit = record(
        &pool,
        json!({
            "user_id": user.id,
            "conn_id": 17,
            "rustdesk_id": " 123456789 ",
            "ip": "198.51.100.4",
            "session_id": "s-1",
            "type": 1
        }),
    )
    .await;

    assert_eq!(audit["data"]["rustdesk_id"], "123456789");
    assert_eq!(audit["data"]["username"], "tech");
    assert_eq!(audit["data"]["type"], 1);
    assert_eq!(audit["data"]["closed_at"], serde_json::Value::Null);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_record_connection_requires_rustdesk_id(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/audit/conn", json!({ "conn_id": 1 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_record_file_transfer(pool: PgPool) {
    let (_staff, token) = user_with_token(&pool, "staff", ROLE_STAFF).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/audit/file",
        json!({ "rustdesk_id": "123", "peer_id": "456", "path": "/tmp/a.txt", "is_file": true, "type": 0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let list = body_json(get_auth(app, "/api/v1/admin/audit/file-transfers?peer_id=456", &token).await).await;
    assert_eq!(list["total"], 1);
    assert_eq!(list["data"][0]["path"], "/tmp/a.txt");
    assert_eq!(list["data"][0]["username"], "-");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_audit_console_lists_and_aggregates(pool: PgPool) {
    let (_user, user_token) = user_with_token(&pool, "reader", ROLE_USER).await;
    let (_staff, token) = user_with_token(&pool, "staff", ROLE_STAFF).await;

    record(&pool, json!({ "rustdesk_id": "111", "conn_id": 1 })).await;
    record(&pool, json!({ "rustdesk_id": "111", "conn_id": 2 })).await;
    record(&pool, json!({ "rustdesk_id": "222", "conn_id": 3 })).await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/admin/audit", &user_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let list = body_json(get_auth(app, "/api/v1/admin/audit?rustdesk_id=111", &token).await).await;
    assert_eq!(list["total"], 2);
    // Newest first.
    assert_eq!(list["data"][0]["conn_id"], 2);

    let app = common::build_test_app(pool);
    let stats = body_json(get_auth(app, "/api/v1/admin/audit/stats", &token).await).await;
    assert_eq!(stats["data"]["total_connections"], 3);
    assert_eq!(stats["data"]["top_devices"][0], json!({ "rustdesk_id": "111", "count": 2 }));
    assert_eq!(stats["data"]["avg_session_secs"], 0.0);
    assert_eq!(stats["data"]["daily"][0]["count"], 3);
}
