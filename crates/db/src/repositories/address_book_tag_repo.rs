//! Repository for the `address_book_tags` table.

use sqlx::PgPool;
use deskrelay_core::types::DbId;

use super::PgTx;
use crate::models::address_book::AddressBookTag;

const COLUMNS: &str = "id, ab_id, name, color, created_at, updated_at";

/// Provides CRUD operations for address book tags.
pub struct AddressBookTagRepo;

impl AddressBookTagRepo {
    pub async fn list_by_ab(pool: &PgPool, ab_id: DbId) -> Result<Vec<AddressBookTag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM address_book_tags WHERE ab_id = $1 ORDER BY id");
        sqlx::query_as::<_, AddressBookTag>(&query)
            .bind(ab_id)
            .fetch_all(pool)
            .await
    }

    /// Tags across every address book owned by the user, in book order.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<AddressBookTag>, sqlx::Error> {
        sqlx::query_as::<_, AddressBookTag>(
            "SELECT t.id, t.ab_id, t.name, t.color, t.created_at, t.updated_at \
             FROM address_book_tags t \
             JOIN address_books ab ON ab.id = t.ab_id \
             WHERE ab.user_id = $1 \
             ORDER BY t.ab_id, t.id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Tags across all address books, in book order.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<AddressBookTag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM address_book_tags ORDER BY ab_id, id");
        sqlx::query_as::<_, AddressBookTag>(&query).fetch_all(pool).await
    }

    pub async fn create(
        pool: &PgPool,
        ab_id: DbId,
        name: &str,
        color: i64,
    ) -> Result<AddressBookTag, sqlx::Error> {
        let query = format!(
            "INSERT INTO address_book_tags (ab_id, name, color) VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AddressBookTag>(&query)
            .bind(ab_id)
            .bind(name)
            .bind(color)
            .fetch_one(pool)
            .await
    }

    /// Create the tag with `color` unless the book already has one by that
    /// name. Returns `true` if a tag was created.
    pub async fn ensure_in_tx(
        tx: &mut PgTx<'_>,
        ab_id: DbId,
        name: &str,
        color: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO address_book_tags (ab_id, name, color) VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_address_book_tags_ab_name DO NOTHING",
        )
        .bind(ab_id)
        .bind(name)
        .bind(color)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert `(name, color)` pairs. Names must already be unique.
    pub async fn insert_many_in_tx(
        tx: &mut PgTx<'_>,
        ab_id: DbId,
        tags: &[(String, i64)],
    ) -> Result<(), sqlx::Error> {
        for (name, color) in tags {
            sqlx::query("INSERT INTO address_book_tags (ab_id, name, color) VALUES ($1, $2, $3)")
                .bind(ab_id)
                .bind(name)
                .bind(color)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    /// Delete a tag only if it belongs to the given address book. Peers that
    /// reference the name are left untouched.
    pub async fn delete_in_ab(pool: &PgPool, ab_id: DbId, tag_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM address_book_tags WHERE id = $1 AND ab_id = $2")
            .bind(tag_id)
            .bind(ab_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_by_ab_in_tx(tx: &mut PgTx<'_>, ab_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM address_book_tags WHERE ab_id = $1")
            .bind(ab_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
