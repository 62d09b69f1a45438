//! Integration tests for the device presence and session timeout queries.

use chrono::{Duration, TimeZone, Utc};
use sqlx::PgPool;
use deskrelay_core::sweep::SESSION_TIMEOUT_NOTE;
use deskrelay_db::models::audit::{AuditFilter, CreateAudit};
use deskrelay_db::models::device::{DeviceFilter, DeviceHeartbeat, DeviceStatus};
use deskrelay_db::repositories::{AuditRepo, DeviceRepo};

fn beat(id: &str, username: &str) -> DeviceHeartbeat {
    DeviceHeartbeat {
        id: id.to_string(),
        username: Some(username.to_string()),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn heartbeat_upserts_and_keeps_metadata(pool: PgPool) {
    let t0 = Utc::now() - Duration::minutes(5);
    let mut first = beat("r1", "alice");
    first.hostname = Some("desk".into());
    DeviceRepo::upsert_heartbeat(&pool, &first, "1.1.1.1", t0).await.unwrap();

    let t1 = Utc::now();
    let device = DeviceRepo::upsert_heartbeat(&pool, &beat("r1", "alice"), "2.2.2.2", t1)
        .await
        .unwrap();
    assert!(device.is_online);
    assert_eq!(device.hostname, "desk");
    assert_eq!(device.ip_address, "2.2.2.2");
    assert_eq!(device.last_seen_at.map(|t| t.timestamp()), Some(t1.timestamp()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stale_devices_go_offline_once(pool: PgPool) {
    let now = Utc::now();
    DeviceRepo::upsert_heartbeat(&pool, &beat("stale", "a"), "", now - Duration::seconds(120))
        .await
        .unwrap();
    DeviceRepo::upsert_heartbeat(&pool, &beat("fresh", "b"), "", now)
        .await
        .unwrap();

    let cutoff = now - Duration::seconds(30);
    assert_eq!(DeviceRepo::mark_stale_offline(&pool, cutoff).await.unwrap(), 1);
    assert_eq!(DeviceRepo::mark_stale_offline(&pool, cutoff).await.unwrap(), 0);

    let stale = DeviceRepo::find_by_rustdesk_id(&pool, "stale").await.unwrap().unwrap();
    let fresh = DeviceRepo::find_by_rustdesk_id(&pool, "fresh").await.unwrap().unwrap();
    assert!(!stale.is_online);
    assert!(fresh.is_online);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn device_list_filters_and_orders_online_first(pool: PgPool) {
    let now = Utc::now();
    DeviceRepo::upsert_heartbeat(&pool, &beat("d1", "zed"), "", now).await.unwrap();
    DeviceRepo::upsert_heartbeat(&pool, &beat("d2", "amy"), "", now - Duration::hours(1))
        .await
        .unwrap();
    DeviceRepo::upsert_heartbeat(&pool, &beat("d3", "bob"), "", now).await.unwrap();
    DeviceRepo::mark_stale_offline(&pool, now - Duration::minutes(1)).await.unwrap();

    let all = DeviceRepo::list(&pool, &DeviceFilter::default(), 10, 0).await.unwrap();
    let order: Vec<_> = all.iter().map(|d| d.rustdesk_id.as_str()).collect();
    assert_eq!(order, vec!["d3", "d1", "d2"]);

    let offline = DeviceFilter {
        status: Some(DeviceStatus::Offline),
        ..Default::default()
    };
    assert_eq!(DeviceRepo::count(&pool, &offline).await.unwrap(), 1);

    let by_name = DeviceFilter {
        username: Some("ZE".into()),
        ..Default::default()
    };
    let found = DeviceRepo::list(&pool, &by_name, 10, 0).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].rustdesk_id, "d1");

    let online = DeviceRepo::list_online(&pool).await.unwrap();
    assert_eq!(online.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn device_filters_match_wildcards_literally(pool: PgPool) {
    let now = Utc::now();
    DeviceRepo::upsert_heartbeat(&pool, &beat("w1", "ops_team"), "", now).await.unwrap();
    DeviceRepo::upsert_heartbeat(&pool, &beat("w2", "opsXteam"), "", now).await.unwrap();
    DeviceRepo::upsert_heartbeat(&pool, &beat("w3", "100%"), "", now).await.unwrap();

    let underscore = DeviceFilter {
        username: Some("s_t".into()),
        ..Default::default()
    };
    let found = DeviceRepo::list(&pool, &underscore, 10, 0).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].rustdesk_id, "w1");

    let percent = DeviceFilter {
        username: Some("%".into()),
        ..Default::default()
    };
    assert_eq!(DeviceRepo::count(&pool, &percent).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn session_sweep_closes_only_stale_open_rows(pool: PgPool) {
    let now = Utc::now();
    let zero = Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap();
    let earlier_close = now - Duration::hours(2);

    let rows = [
        ("stale-null", now - Duration::hours(3), None),
        ("stale-zero", now - Duration::hours(3), Some(zero)),
        ("recent", now - Duration::minutes(10), None),
        ("closed", now - Duration::hours(5), Some(earlier_close)),
    ];
    for (session, created_at, closed_at) in rows {
        AuditRepo::create(
            &pool,
            &CreateAudit {
                session_id: session.to_string(),
                rustdesk_id: "r".into(),
                created_at: Some(created_at),
                closed_at,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    let cutoff = now - Duration::hours(2);
    let closed = AuditRepo::close_stale_sessions(&pool, cutoff, now, SESSION_TIMEOUT_NOTE)
        .await
        .unwrap();
    assert_eq!(closed, 2);
    let again = AuditRepo::close_stale_sessions(&pool, cutoff, now, SESSION_TIMEOUT_NOTE)
        .await
        .unwrap();
    assert_eq!(again, 0);

    let all = AuditRepo::list(&pool, &AuditFilter::default(), 10, 0).await.unwrap();
    for audit in all {
        match audit.session_id.as_str() {
            "stale-null" | "stale-zero" => {
                assert_eq!(audit.note, SESSION_TIMEOUT_NOTE);
                assert_eq!(audit.closed_at.map(|t| t.timestamp()), Some(now.timestamp()));
            }
            "recent" => {
                assert!(audit.closed_at.is_none());
                assert_eq!(audit.note, "");
            }
            "closed" => {
                assert_eq!(audit.closed_at.map(|t| t.timestamp()), Some(earlier_close.timestamp()));
                assert_eq!(audit.note, "");
            }
            other => panic!("unexpected session {other}"),
        }
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn audit_list_filters_and_reports_unknown_user(pool: PgPool) {
    for (conn_id, ip) in [(1, "10.0.0.1"), (2, "10.0.0.2")] {
        AuditRepo::create(
            &pool,
            &CreateAudit {
                conn_id,
                ip: ip.to_string(),
                rustdesk_id: "dev".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    let filter = AuditFilter {
        ip: Some("10.0.0.2".into()),
        ..Default::default()
    };
    let rows = AuditRepo::list(&pool, &filter, 10, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].conn_id, 2);
    assert_eq!(rows[0].username, "-");
    assert_eq!(AuditRepo::count(&pool, &filter).await.unwrap(), 1);

    let stats = AuditRepo::stats(&pool, Utc::now()).await.unwrap();
    assert_eq!(stats.total_connections, 2);
    assert_eq!(stats.top_devices[0].rustdesk_id, "dev");
    assert_eq!(stats.top_devices[0].count, 2);
    assert!(stats.top_users.is_empty());
    assert_eq!(stats.avg_session_secs, 0.0);
    assert_eq!(stats.daily.iter().map(|d| d.count).sum::<i64>(), 2);
}
