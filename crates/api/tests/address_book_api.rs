//! HTTP-level integration tests for the client and console address book
//! endpoints and device heartbeats.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_user, delete_auth, get, get_auth, post_auth, post_json, post_json_auth,
    token_for, user_with_token, ROLE_STAFF, ROLE_USER,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Packed client payload with one tagged peer per id.
fn packed(tags: &[(&str, i64)], peer_ids: &[&str]) -> String {
    let tag_names: Vec<&str> = tags.iter().map(|(n, _)| *n).collect();
    let colors: serde_json::Map<String, serde_json::Value> = tags
        .iter()
        .map(|(n, c)| (n.to_string(), json!(c)))
        .collect();
    let peers: Vec<serde_json::Value> = peer_ids
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "hash": "",
                "username": "alice",
                "hostname": format!("host-{id}"),
                "platform": "Windows",
                "alias": "",
                "tags": tag_names,
            })
        })
        .collect();
    json!({
        "tags": tag_names,
        "peers": peers,
        "tag_colors": serde_json::to_string(&colors).unwrap(),
    })
    .to_string()
}

/// Decode the packed `data` string of a client response.
fn unpacked(json: &serde_json::Value) -> serde_json::Value {
    serde_json::from_str(json["data"].as_str().expect("data must be a string")).unwrap()
}

async fn heartbeat(pool: &PgPool, id: &str) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/heartbeat", json!({ "id": id, "hostname": format!("host-{id}") })).await;
    assert_eq!(response.status(), StatusCode::OK);
}

async fn create_book(pool: &PgPool, staff_token: &str, owner_id: i64, name: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/admin/address-books",
        json!({ "user_id": owner_id, "name": name, "rule": 2, "max_peer": 50 }),
        staff_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Client address book
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_client_ab_requires_auth(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/ab").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_legacy_replace_then_resolve_round_trips(pool: PgPool) {
    let user = create_user(&pool, "alice", ROLE_USER, 5).await;
    let token = token_for(user.id, ROLE_USER);

    let app = common::build_test_app(pool.clone());
    let data = packed(&[("work", 4278190335), ("home", 16711680)], &["100", "200"]);
    let response = post_json_auth(app, "/api/v1/ab", json!({ "data": data }), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/ab", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["licensed_devices"], 5);

    let ab = unpacked(&json);
    assert_eq!(ab["tags"], json!(["work", "home"]));
    assert_eq!(ab["peers"].as_array().unwrap().len(), 2);
    assert_eq!(ab["peers"][0]["id"], "100");
    assert_eq!(ab["peers"][0]["tags"], json!(["work", "home"]));

    let colors: serde_json::Value = serde_json::from_str(ab["tag_colors"].as_str().unwrap()).unwrap();
    assert_eq!(colors["work"], 4278190335_i64);
    assert_eq!(colors["home"], 16711680);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_over_license_cap_is_rejected_and_keeps_data(pool: PgPool) {
    let user = create_user(&pool, "capped", ROLE_USER, 1).await;
    let token = token_for(user.id, ROLE_USER);

    let app = common::build_test_app(pool.clone());
    let first = packed(&[("t", 1)], &["1"]);
    let response = post_json_auth(app, "/api/v1/ab", json!({ "data": first }), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let too_many = packed(&[("t", 1)], &["1", "2"]);
    let response = post_json_auth(app, "/api/v1/ab", json!({ "data": too_many }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/ab", &token).await).await;
    let ab = unpacked(&json);
    assert_eq!(ab["peers"].as_array().unwrap().len(), 1);
    assert_eq!(ab["peers"][0]["id"], "1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_malformed_payload_is_rejected(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "bob", ROLE_USER).await;
    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/ab", json!({ "data": "{not json" }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_personal_book_is_created_once(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "carol", ROLE_USER).await;

    let app = common::build_test_app(pool.clone());
    let response = post_auth(app, "/api/v1/ab/personal", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let guid = body_json(response).await["guid"].as_str().unwrap().to_string();
    assert!(!guid.is_empty());

    let app = common::build_test_app(pool.clone());
    let again = body_json(post_auth(app, "/api/v1/ab/personal", &token).await).await;
    assert_eq!(again["guid"], guid.as_str());

    let app = common::build_test_app(pool);
    let settings = body_json(post_auth(app, "/api/v1/ab/settings", &token).await).await;
    assert_eq!(settings["max_peer_one_ab"], 200);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_settings_without_personal_book_is_zero(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "dave", ROLE_USER).await;
    let app = common::build_test_app(pool);
    let settings = body_json(get_auth(app, "/api/v1/ab/settings", &token).await).await;
    assert_eq!(settings["max_peer_one_ab"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_by_unknown_name_returns_404(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "erin", ROLE_USER).await;
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/ab/get?name=Nope", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_by_name_returns_book_contents(pool: PgPool) {
    let (owner, owner_token) = user_with_token(&pool, "frank", ROLE_USER).await;
    let (_staff, staff_token) = user_with_token(&pool, "staff", ROLE_STAFF).await;
    let ab_id = create_book(&pool, &staff_token, owner.id, "Servers").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/admin/address-books/{ab_id}/peers"),
        json!({ "rustdesk_id": "555", "tags": ["prod"] }),
        &staff_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/ab/get?name=Servers", &owner_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let ab = unpacked(&body_json(response).await);
    assert_eq!(ab["tags"], json!(["prod"]));
    assert_eq!(ab["peers"][0]["id"], "555");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_shared_profiles_are_paginated(pool: PgPool) {
    let (owner, token) = user_with_token(&pool, "gina", ROLE_USER).await;
    let (_staff, staff_token) = user_with_token(&pool, "staff", ROLE_STAFF).await;
    for name in ["A", "B", "C"] {
        let app = common::build_test_app(pool.clone());
        let response = post_json_auth(
            app,
            "/api/v1/admin/address-books",
            json!({ "user_id": owner.id, "name": name, "shared": true }),
            &staff_token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    create_book(&pool, &staff_token, owner.id, "Private").await;

    let app = common::build_test_app(pool);
    let response = post_auth(app, "/api/v1/ab/shared/profiles?current=2&pageSize=2", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 3);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["name"], "C");
}

// ---------------------------------------------------------------------------
// Console address books
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_console_requires_staff(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "plain", ROLE_USER).await;
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/address-books", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_book_name_returns_409(pool: PgPool) {
    let (owner, _) = user_with_token(&pool, "hank", ROLE_USER).await;
    let (_staff, staff_token) = user_with_token(&pool, "staff", ROLE_STAFF).await;
    create_book(&pool, &staff_token, owner.id, "Team").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/admin/address-books",
        json!({ "user_id": owner.id, "name": "Team" }),
        &staff_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_add_peer_creates_default_colored_tag(pool: PgPool) {
    let (owner, _) = user_with_token(&pool, "ivy", ROLE_USER).await;
    let (_staff, staff_token) = user_with_token(&pool, "staff", ROLE_STAFF).await;
    let ab_id = create_book(&pool, &staff_token, owner.id, "Lab").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/admin/address-books/{ab_id}/peers"),
        json!({ "rustdesk_id": "777", "alias": "bench", "tags": ["lab", "lab"] }),
        &staff_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let tags = body_json(
        get_auth(app, &format!("/api/v1/admin/address-books/{ab_id}/tags"), &staff_token).await,
    )
    .await;
    let tags = tags["data"].as_array().unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0]["name"], "lab");
    assert_eq!(tags[0]["color"], 4278190335_i64);

    // Same rustdesk id again is rejected.
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/admin/address-books/{ab_id}/peers"),
        json!({ "rustdesk_id": "777" }),
        &staff_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_peer_list_reports_presence(pool: PgPool) {
    let (owner, _) = user_with_token(&pool, "jack", ROLE_USER).await;
    let (_staff, staff_token) = user_with_token(&pool, "staff", ROLE_STAFF).await;
    let ab_id = create_book(&pool, &staff_token, owner.id, "Fleet").await;
    heartbeat(&pool, "online-1").await;

    for id in ["online-1", "ghost"] {
        let app = common::build_test_app(pool.clone());
        let response = post_json_auth(
            app,
            &format!("/api/v1/admin/address-books/{ab_id}/peers"),
            json!({ "rustdesk_id": id, "tags": ["fleet"] }),
            &staff_token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let app = common::build_test_app(pool);
    let json = body_json(
        get_auth(app, &format!("/api/v1/admin/address-books/{ab_id}/peers"), &staff_token).await,
    )
    .await;
    assert_eq!(json["total"], 2);
    let peers = json["data"].as_array().unwrap();
    assert_eq!(peers[0]["rustdesk_id"], "online-1");
    assert_eq!(peers[0]["is_online"], true);
    assert_eq!(peers[0]["tags"], json!(["fleet"]));
    assert_eq!(peers[1]["rustdesk_id"], "ghost");
    assert_eq!(peers[1]["is_online"], false);
    assert!(peers[1]["last_seen_at"].is_null());
    assert!(peers[0].get("password").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_import_devices_twice_skips_existing(pool: PgPool) {
    let (owner, _) = user_with_token(&pool, "kate", ROLE_USER).await;
    let (_staff, staff_token) = user_with_token(&pool, "staff", ROLE_STAFF).await;
    let ab_id = create_book(&pool, &staff_token, owner.id, "Imported").await;
    for id in ["d1", "d2"] {
        heartbeat(&pool, id).await;
    }

    let uri = format!("/api/v1/admin/address-books/{ab_id}/import-devices");
    let app = common::build_test_app(pool.clone());
    let first = body_json(post_auth(app, &uri, &staff_token).await).await;
    assert_eq!(first["data"], json!({ "imported": 2, "skipped": 0, "total": 2 }));

    let app = common::build_test_app(pool);
    let second = body_json(post_auth(app, &uri, &staff_token).await).await;
    assert_eq!(second["data"], json!({ "imported": 0, "skipped": 2, "total": 2 }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_book_removes_it(pool: PgPool) {
    let (owner, _) = user_with_token(&pool, "liam", ROLE_USER).await;
    let (_staff, staff_token) = user_with_token(&pool, "staff", ROLE_STAFF).await;
    let ab_id = create_book(&pool, &staff_token, owner.id, "Temp").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/admin/address-books/{ab_id}/peers"),
        json!({ "rustdesk_id": "42" }),
        &staff_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/admin/address-books/{ab_id}"), &staff_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/admin/address-books/{ab_id}"), &staff_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM peers WHERE ab_id = $1")
        .bind(ab_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_peer_from_other_book_returns_404(pool: PgPool) {
    let (owner, _) = user_with_token(&pool, "mia", ROLE_USER).await;
    let (_staff, staff_token) = user_with_token(&pool, "staff", ROLE_STAFF).await;
    let first = create_book(&pool, &staff_token, owner.id, "One").await;
    let second = create_book(&pool, &staff_token, owner.id, "Two").await;

    let app = common::build_test_app(pool.clone());
    let peer = body_json(
        post_json_auth(
            app,
            &format!("/api/v1/admin/address-books/{first}/peers"),
            json!({ "rustdesk_id": "9" }),
            &staff_token,
        )
        .await,
    )
    .await;
    let peer_id = peer["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = delete_auth(
        app,
        &format!("/api/v1/admin/address-books/{second}/peers/{peer_id}"),
        &staff_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_heartbeat_requires_id(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/heartbeat", json!({ "id": "  " })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_heartbeat_records_forwarded_ip(pool: PgPool) {
    use axum::body::Body;
    use axum::http::{header::CONTENT_TYPE, Method, Request};
    use tower::ServiceExt;

    let app = common::build_test_app(pool.clone());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/heartbeat")
        .header(CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .body(Body::from(json!({ "id": "fw-1" }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_staff, staff_token) = user_with_token(&pool, "staff", ROLE_STAFF).await;
    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/admin/devices/online", &staff_token).await).await;
    assert_eq!(json["data"][0]["rustdesk_id"], "fw-1");
    assert_eq!(json["data"][0]["ip_address"], "203.0.113.7");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_device_list_filters_by_status(pool: PgPool) {
    heartbeat(&pool, "on-1").await;
    sqlx::query(
        "INSERT INTO devices (rustdesk_id, username, is_online) VALUES ('off-1', 'zed', FALSE)",
    )
    .execute(&pool)
    .await
    .unwrap();
    let (_staff, staff_token) = user_with_token(&pool, "staff", ROLE_STAFF).await;

    let app = common::build_test_app(pool.clone());
    let all = body_json(get_auth(app, "/api/v1/admin/devices", &staff_token).await).await;
    assert_eq!(all["total"], 2);
    assert_eq!(all["data"][0]["rustdesk_id"], "on-1");

    let app = common::build_test_app(pool);
    let offline = body_json(get_auth(app, "/api/v1/admin/devices?status=offline", &staff_token).await).await;
    assert_eq!(offline["total"], 1);
    assert_eq!(offline["data"][0]["rustdesk_id"], "off-1");
}
