//! Repository for the `ticket_comments` table.

use sqlx::PgPool;
use deskrelay_core::json_list;
use deskrelay_core::types::DbId;

use crate::models::helpdesk::{CreateTicketComment, TicketComment};

const COLUMNS: &str = "\
    id, ticket_id, user_id, username, body, attachments, is_internal, created_at";

pub struct TicketCommentRepo;

impl TicketCommentRepo {
    /// Comments on a ticket, oldest first. Internal comments are included
    /// only when `include_internal` is set.
    pub async fn list_by_ticket(
        pool: &PgPool,
        ticket_id: DbId,
        include_internal: bool,
    ) -> Result<Vec<TicketComment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ticket_comments \
             WHERE ticket_id = $1 AND ($2 OR NOT is_internal) \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, TicketComment>(&query)
            .bind(ticket_id)
            .bind(include_internal)
            .fetch_all(pool)
            .await
    }

    /// Insert a comment. `is_internal` is taken as given; callers decide
    /// whether the author may write internal comments.
    pub async fn create(
        pool: &PgPool,
        ticket_id: DbId,
        user_id: DbId,
        username: &str,
        input: &CreateTicketComment,
        is_internal: bool,
    ) -> Result<TicketComment, sqlx::Error> {
        let query = format!(
            "INSERT INTO ticket_comments (ticket_id, user_id, username, body, attachments, is_internal) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TicketComment>(&query)
            .bind(ticket_id)
            .bind(user_id)
            .bind(username)
            .bind(&input.body)
            .bind(json_list::encode(&input.attachments))
            .bind(is_internal)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TicketComment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ticket_comments WHERE id = $1");
        sqlx::query_as::<_, TicketComment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ticket_comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
