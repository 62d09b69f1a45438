//! Repository for the `peers` table (shared and legacy models).

use sqlx::PgPool;
use deskrelay_core::address_book::AbPeer;
use deskrelay_core::json_list;
use deskrelay_core::types::DbId;

use super::PgTx;
use crate::models::address_book::{CreatePeer, Peer, PeerWithPresence};
use crate::models::device::Device;

const COLUMNS: &str = "\
    id, user_id, ab_id, rustdesk_id, hash, username, hostname, platform, \
    alias, password, tags, created_at, updated_at";

/// Provides CRUD operations for peers.
pub struct PeerRepo;

impl PeerRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn list_by_ab(pool: &PgPool, ab_id: DbId) -> Result<Vec<Peer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM peers WHERE ab_id = $1 ORDER BY id");
        sqlx::query_as::<_, Peer>(&query)
            .bind(ab_id)
            .fetch_all(pool)
            .await
    }

    /// Legacy peers: owned by the user and attached to no address book.
    pub async fn list_legacy_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Peer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM peers WHERE user_id = $1 AND ab_id IS NULL ORDER BY id"
        );
        sqlx::query_as::<_, Peer>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Every peer attached to any address book, grouped by book.
    pub async fn list_all_in_books(pool: &PgPool) -> Result<Vec<Peer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM peers WHERE ab_id IS NOT NULL ORDER BY ab_id, id"
        );
        sqlx::query_as::<_, Peer>(&query).fetch_all(pool).await
    }

    /// Peers of an address book joined with the presence of the device that
    /// shares their rustdesk id. Peers without a device report offline.
    pub async fn list_with_presence(
        pool: &PgPool,
        ab_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PeerWithPresence>, sqlx::Error> {
        sqlx::query_as::<_, PeerWithPresence>(
            "SELECT p.id, p.ab_id, p.rustdesk_id, p.hash, p.username, p.hostname, \
                    p.platform, p.alias, p.tags AS tags_json, p.created_at, \
                    COALESCE(d.is_online, FALSE) AS is_online, \
                    d.last_seen_at, d.ip_address \
             FROM peers p \
             LEFT JOIN devices d ON d.rustdesk_id = p.rustdesk_id \
             WHERE p.ab_id = $1 \
             ORDER BY p.id \
             LIMIT $2 OFFSET $3",
        )
        .bind(ab_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    pub async fn count_by_ab(pool: &PgPool, ab_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM peers WHERE ab_id = $1")
            .bind(ab_id)
            .fetch_one(pool)
            .await
    }

    /// Whether the address book already holds a peer with this rustdesk id.
    pub async fn exists_in_ab(
        pool: &PgPool,
        ab_id: DbId,
        rustdesk_id: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM peers WHERE ab_id = $1 AND rustdesk_id = $2)",
        )
        .bind(ab_id)
        .bind(rustdesk_id)
        .fetch_one(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert a peer seeded from a device, aliased by its rustdesk id.
    pub async fn create_from_device(
        pool: &PgPool,
        user_id: DbId,
        ab_id: DbId,
        device: &Device,
    ) -> Result<Peer, sqlx::Error> {
        let query = format!(
            "INSERT INTO peers (user_id, ab_id, rustdesk_id, username, hostname, platform, alias) \
             VALUES ($1, $2, $3, $4, $5, $6, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Peer>(&query)
            .bind(user_id)
            .bind(ab_id)
            .bind(&device.rustdesk_id)
            .bind(&device.username)
            .bind(&device.hostname)
            .bind(&device.os)
            .fetch_one(pool)
            .await
    }

    /// Insert a console-entered peer. `rustdesk_id` must already be validated.
    pub async fn create_in_tx(
        tx: &mut PgTx<'_>,
        user_id: DbId,
        ab_id: DbId,
        rustdesk_id: &str,
        input: &CreatePeer,
    ) -> Result<Peer, sqlx::Error> {
        let query = format!(
            "INSERT INTO peers \
                 (user_id, ab_id, rustdesk_id, hash, username, hostname, platform, alias, password, tags) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Peer>(&query)
            .bind(user_id)
            .bind(ab_id)
            .bind(rustdesk_id)
            .bind(&input.hash)
            .bind(&input.username)
            .bind(&input.hostname)
            .bind(&input.platform)
            .bind(&input.alias)
            .bind(input.password.as_deref())
            .bind(json_list::encode(&input.tags))
            .fetch_one(&mut **tx)
            .await
    }

    /// Insert client-supplied peers. `ab_id = None` writes legacy peers.
    pub async fn insert_many_in_tx(
        tx: &mut PgTx<'_>,
        user_id: DbId,
        ab_id: Option<DbId>,
        peers: &[AbPeer],
    ) -> Result<(), sqlx::Error> {
        for peer in peers {
            sqlx::query(
                "INSERT INTO peers \
                     (user_id, ab_id, rustdesk_id, hash, username, hostname, platform, alias, tags) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(user_id)
            .bind(ab_id)
            .bind(&peer.id)
            .bind(&peer.hash)
            .bind(&peer.username)
            .bind(&peer.hostname)
            .bind(&peer.platform)
            .bind(&peer.alias)
            .bind(json_list::encode(&peer.tags))
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Delete a peer only if it belongs to the given address book.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete_in_ab(pool: &PgPool, ab_id: DbId, peer_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM peers WHERE id = $1 AND ab_id = $2")
            .bind(peer_id)
            .bind(ab_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_by_ab_in_tx(tx: &mut PgTx<'_>, ab_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM peers WHERE ab_id = $1")
            .bind(ab_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_legacy_by_user_in_tx(
        tx: &mut PgTx<'_>,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM peers WHERE user_id = $1 AND ab_id IS NULL")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
