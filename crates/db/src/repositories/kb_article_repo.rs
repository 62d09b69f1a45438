//! Repository for the `kb_articles` table.

use sqlx::PgPool;
use deskrelay_core::json_list;
use deskrelay_core::types::DbId;

use super::address_book_repo::like_pattern;
use crate::models::helpdesk::{
    CreateKbArticle, KbArticle, KbArticleFilter, KbArticleViews, UpdateKbArticle,
};

const COLUMNS: &str = "\
    id, category_id, title, content, tags, is_pinned, views, author_id, \
    author_name, from_ticket, created_at, updated_at";

/// Binds `$1` category, `$2` search pattern, `$3` pinned flag.
const FILTER: &str = "\
    WHERE ($1::BIGINT IS NULL OR category_id = $1) \
      AND ($2::TEXT IS NULL \
           OR title ILIKE $2 ESCAPE '\\' \
           OR content ILIKE $2 ESCAPE '\\' \
           OR tags ILIKE $2 ESCAPE '\\') \
      AND ($3::BOOLEAN IS NULL OR is_pinned = $3)";

pub struct KbArticleRepo;

impl KbArticleRepo {
    /// Insert an article. `from_ticket` links articles produced by conversion.
    pub async fn create(
        pool: &PgPool,
        input: &CreateKbArticle,
        author_id: DbId,
        author_name: &str,
        from_ticket: Option<DbId>,
    ) -> Result<KbArticle, sqlx::Error> {
        let query = format!(
            "INSERT INTO kb_articles \
                 (category_id, title, content, tags, is_pinned, author_id, author_name, from_ticket) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, KbArticle>(&query)
            .bind(input.category_id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(json_list::encode(&input.tags))
            .bind(input.is_pinned)
            .bind(author_id)
            .bind(author_name)
            .bind(from_ticket)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<KbArticle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM kb_articles WHERE id = $1");
        sqlx::query_as::<_, KbArticle>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Filtered listing: pinned first, then newest.
    pub async fn list(
        pool: &PgPool,
        filter: &KbArticleFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<KbArticle>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM kb_articles {FILTER} \
             ORDER BY is_pinned DESC, created_at DESC, id DESC \
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, KbArticle>(&query)
            .bind(filter.category_id)
            .bind(filter.search.as_deref().map(like_pattern))
            .bind(filter.pinned)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &KbArticleFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM kb_articles {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(filter.category_id)
            .bind(filter.search.as_deref().map(like_pattern))
            .bind(filter.pinned)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateKbArticle,
    ) -> Result<Option<KbArticle>, sqlx::Error> {
        let query = format!(
            "UPDATE kb_articles SET \
                 category_id = COALESCE($2, category_id), \
                 title = COALESCE($3, title), \
                 content = COALESCE($4, content), \
                 tags = COALESCE($5, tags), \
                 is_pinned = COALESCE($6, is_pinned) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, KbArticle>(&query)
            .bind(id)
            .bind(input.category_id)
            .bind(input.title.as_deref())
            .bind(input.content.as_deref())
            .bind(input.tags.as_deref().map(json_list::encode))
            .bind(input.is_pinned)
            .fetch_optional(pool)
            .await
    }

    /// Bump the view counter. Returns `false` if the article does not exist.
    pub async fn increment_views(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE kb_articles SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM kb_articles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM kb_articles")
            .fetch_one(pool)
            .await
    }

    pub async fn most_viewed(pool: &PgPool, limit: i64) -> Result<Vec<KbArticleViews>, sqlx::Error> {
        sqlx::query_as::<_, KbArticleViews>(
            "SELECT id, title, views FROM kb_articles ORDER BY views DESC, id LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
