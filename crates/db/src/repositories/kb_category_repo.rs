//! Repository for the `kb_categories` table.

use sqlx::PgPool;
use deskrelay_core::types::DbId;

use crate::models::helpdesk::{CreateKbCategory, KbCategory, UpdateKbCategory};

const COLUMNS: &str = "id, name, icon, sort_order, created_at, updated_at";

pub struct KbCategoryRepo;

impl KbCategoryRepo {
    /// All categories by sort order, then name.
    pub async fn list(pool: &PgPool) -> Result<Vec<KbCategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM kb_categories ORDER BY sort_order, name");
        sqlx::query_as::<_, KbCategory>(&query).fetch_all(pool).await
    }

    pub async fn create(pool: &PgPool, input: &CreateKbCategory) -> Result<KbCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO kb_categories (name, icon, sort_order) VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, KbCategory>(&query)
            .bind(input.name.trim())
            .bind(&input.icon)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateKbCategory,
    ) -> Result<Option<KbCategory>, sqlx::Error> {
        let query = format!(
            "UPDATE kb_categories SET \
                 name = COALESCE($2, name), \
                 icon = COALESCE($3, icon), \
                 sort_order = COALESCE($4, sort_order) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, KbCategory>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.icon.as_deref())
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM kb_categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
