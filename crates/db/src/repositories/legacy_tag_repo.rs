//! Repository for the legacy per-user `tags` table.

use sqlx::PgPool;
use deskrelay_core::types::DbId;

use super::PgTx;
use crate::models::address_book::LegacyTag;

const COLUMNS: &str = "id, user_id, tag, color, created_at, updated_at";

pub struct LegacyTagRepo;

impl LegacyTagRepo {
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<LegacyTag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags WHERE user_id = $1 ORDER BY id");
        sqlx::query_as::<_, LegacyTag>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Insert `(tag, decimal color)` pairs. Names must already be unique.
    pub async fn insert_many_in_tx(
        tx: &mut PgTx<'_>,
        user_id: DbId,
        tags: &[(String, String)],
    ) -> Result<(), sqlx::Error> {
        for (tag, color) in tags {
            sqlx::query("INSERT INTO tags (user_id, tag, color) VALUES ($1, $2, $3)")
                .bind(user_id)
                .bind(tag)
                .bind(color)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    pub async fn delete_by_user_in_tx(tx: &mut PgTx<'_>, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
