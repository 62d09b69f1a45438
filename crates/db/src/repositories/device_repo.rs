//! Repository for the `devices` table.

use sqlx::PgPool;
use deskrelay_core::types::Timestamp;

use crate::models::device::{Device, DeviceFilter, DeviceHeartbeat};
use super::address_book_repo::like_pattern;

const COLUMNS: &str = "\
    id, rustdesk_id, uuid, hostname, username, os, version, cpu, memory, \
    ip_address, conns, is_online, last_seen_at, created_at, updated_at";

/// Binds `$1` hostname, `$2` username, `$3` rustdesk id (substring
/// patterns) and `$4` online flag; each is ignored when NULL.
const FILTER: &str = "\
    WHERE ($1::TEXT IS NULL OR hostname ILIKE $1 ESCAPE '\\') \
      AND ($2::TEXT IS NULL OR username ILIKE $2 ESCAPE '\\') \
      AND ($3::TEXT IS NULL OR rustdesk_id ILIKE $3 ESCAPE '\\') \
      AND ($4::BOOLEAN IS NULL OR is_online = $4)";

/// Provides presence writes and console queries for devices.
pub struct DeviceRepo;

impl DeviceRepo {
    /// Record a heartbeat: insert or update the device by rustdesk id, mark it
    /// online and stamp `last_seen_at`/`updated_at` with `now`.
    ///
    /// Metadata fields absent from the heartbeat keep their stored values.
    /// Concurrent heartbeats for the same device are last-writer-wins.
    pub async fn upsert_heartbeat(
        pool: &PgPool,
        heartbeat: &DeviceHeartbeat,
        ip_address: &str,
        now: Timestamp,
    ) -> Result<Device, sqlx::Error> {
        let query = format!(
            "INSERT INTO devices \
                 (rustdesk_id, uuid, hostname, username, os, version, cpu, memory, \
                  ip_address, conns, is_online, last_seen_at, updated_at) \
             VALUES ($1, COALESCE($2, ''), COALESCE($3, ''), COALESCE($4, ''), \
                     COALESCE($5, ''), COALESCE($6, ''), COALESCE($7, ''), COALESCE($8, ''), \
                     $9, COALESCE($10, 0), TRUE, $11, $11) \
             ON CONFLICT ON CONSTRAINT uq_devices_rustdesk_id DO UPDATE SET \
                 uuid = COALESCE($2, devices.uuid), \
                 hostname = COALESCE($3, devices.hostname), \
                 username = COALESCE($4, devices.username), \
                 os = COALESCE($5, devices.os), \
                 version = COALESCE($6, devices.version), \
                 cpu = COALESCE($7, devices.cpu), \
                 memory = COALESCE($8, devices.memory), \
                 ip_address = $9, \
                 conns = COALESCE($10, devices.conns), \
                 is_online = TRUE, \
                 last_seen_at = $11, \
                 updated_at = $11 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(heartbeat.id.trim())
            .bind(heartbeat.uuid.as_deref())
            .bind(heartbeat.hostname.as_deref())
            .bind(heartbeat.username.as_deref())
            .bind(heartbeat.os.as_deref())
            .bind(heartbeat.version.as_deref())
            .bind(heartbeat.cpu.as_deref())
            .bind(heartbeat.memory.as_deref())
            .bind(ip_address)
            .bind(heartbeat.conns)
            .bind(now)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_rustdesk_id(
        pool: &PgPool,
        rustdesk_id: &str,
    ) -> Result<Option<Device>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM devices WHERE rustdesk_id = $1");
        sqlx::query_as::<_, Device>(&query)
            .bind(rustdesk_id)
            .fetch_optional(pool)
            .await
    }

    /// Console listing: online devices first, then by username.
    pub async fn list(
        pool: &PgPool,
        filter: &DeviceFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Device>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM devices {FILTER} \
             ORDER BY is_online DESC, username, id \
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(filter.hostname.as_deref().map(like_pattern))
            .bind(filter.username.as_deref().map(like_pattern))
            .bind(filter.rustdesk_id.as_deref().map(like_pattern))
            .bind(filter.status.map(|s| s.is_online()))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &DeviceFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM devices {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(filter.hostname.as_deref().map(like_pattern))
            .bind(filter.username.as_deref().map(like_pattern))
            .bind(filter.rustdesk_id.as_deref().map(like_pattern))
            .bind(filter.status.map(|s| s.is_online()))
            .fetch_one(pool)
            .await
    }

    /// All online devices, most recently seen first.
    pub async fn list_online(pool: &PgPool) -> Result<Vec<Device>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM devices WHERE is_online \
             ORDER BY last_seen_at DESC NULLS LAST, id"
        );
        sqlx::query_as::<_, Device>(&query).fetch_all(pool).await
    }

    /// Flip every online device not updated since `cutoff` to offline.
    ///
    /// Returns the number of devices changed.
    pub async fn mark_stale_offline(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE devices SET is_online = FALSE WHERE is_online AND updated_at <= $1",
        )
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
