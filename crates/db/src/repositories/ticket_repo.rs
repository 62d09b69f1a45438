//! Repository for the `tickets` table.

use sqlx::PgPool;
use deskrelay_core::helpdesk::{DEFAULT_PRIORITY, TICKET_STATUS_RESOLVED};
use deskrelay_core::json_list;
use deskrelay_core::types::{DbId, Timestamp};

use super::PgTx;
use crate::models::helpdesk::{CreateTicket, Ticket, TicketFilter, TicketStatusCount, UpdateTicket};

/// Select list over a relation aliased `t`, with the comment count.
const COLUMNS: &str = "\
    t.id, t.title, t.description, t.status, t.priority, t.category_id, \
    t.attachments, t.creator_id, t.creator_name, t.assigned_to, t.resolved_by, \
    t.resolved_at, t.created_at, t.updated_at, \
    (SELECT COUNT(*) FROM ticket_comments c WHERE c.ticket_id = t.id)::BIGINT AS comment_count";

const FILTER: &str = "\
    WHERE ($1::INTEGER IS NULL OR t.status = $1) \
      AND ($2::INTEGER IS NULL OR t.priority = $2) \
      AND ($3::BIGINT IS NULL OR t.creator_id = $3)";

pub struct TicketRepo;

impl TicketRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateTicket,
        creator_id: DbId,
        creator_name: &str,
    ) -> Result<Ticket, sqlx::Error> {
        let query = format!(
            "WITH t AS ( \
                 INSERT INTO tickets \
                     (title, description, priority, category_id, attachments, creator_id, creator_name) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 RETURNING * \
             ) \
             SELECT {COLUMNS} FROM t"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.priority.unwrap_or(DEFAULT_PRIORITY))
            .bind(input.category_id)
            .bind(json_list::encode(&input.attachments))
            .bind(creator_id)
            .bind(creator_name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets t WHERE t.id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Filtered listing: highest priority first, then newest.
    pub async fn list(
        pool: &PgPool,
        filter: &TicketFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tickets t {FILTER} \
             ORDER BY t.priority DESC, t.created_at DESC, t.id DESC \
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(filter.status)
            .bind(filter.priority)
            .bind(filter.creator_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &TicketFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM tickets t {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(filter.status)
            .bind(filter.priority)
            .bind(filter.creator_id)
            .fetch_one(pool)
            .await
    }

    /// Patch status, priority and assignee. Returns `None` if not found.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTicket,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "WITH t AS ( \
                 UPDATE tickets SET \
                     status = COALESCE($2, status), \
                     priority = COALESCE($3, priority), \
                     assigned_to = COALESCE($4, assigned_to) \
                 WHERE id = $1 \
                 RETURNING * \
             ) \
             SELECT {COLUMNS} FROM t"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(input.status)
            .bind(input.priority)
            .bind(input.assigned_to)
            .fetch_optional(pool)
            .await
    }

    /// Mark a ticket resolved by `resolver` at `now`.
    pub async fn resolve(
        pool: &PgPool,
        id: DbId,
        resolver: DbId,
        now: Timestamp,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "WITH t AS ( \
                 UPDATE tickets SET status = $2, resolved_by = $3, resolved_at = $4 \
                 WHERE id = $1 \
                 RETURNING * \
             ) \
             SELECT {COLUMNS} FROM t"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(TICKET_STATUS_RESOLVED)
            .bind(resolver)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Delete a ticket and its comments atomically. Returns `true` if the
    /// ticket existed.
    pub async fn delete_with_comments(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::delete_comments_in_tx(&mut tx, id).await?;
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<TicketStatusCount>, sqlx::Error> {
        sqlx::query_as::<_, TicketStatusCount>(
            "SELECT status, COUNT(*)::BIGINT AS count FROM tickets GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await
    }

    async fn delete_comments_in_tx(tx: &mut PgTx<'_>, ticket_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ticket_comments WHERE ticket_id = $1")
            .bind(ticket_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
