//! Repository for the `address_books` table.

use sqlx::PgPool;
use deskrelay_core::address_book::{
    new_guid, DEFAULT_MAX_PEER, PERSONAL_ADDRESS_BOOK_NAME, PERSONAL_ADDRESS_BOOK_NOTE,
    RULE_FULL_CONTROL,
};
use deskrelay_core::types::DbId;

use super::PgTx;
use crate::models::address_book::{AddressBook, AddressBookFilter, UpdateAddressBook};

const COLUMNS: &str = "\
    id, user_id, guid, name, owner, note, rule, max_peer, shared, \
    created_at, updated_at";

/// Shared `WHERE` clause for console listing. Binds `$1` user id,
/// `$2` name pattern, `$3` shared flag; each is ignored when NULL.
const FILTER: &str = "\
    WHERE ($1::BIGINT IS NULL OR user_id = $1) \
      AND ($2::TEXT IS NULL OR name ILIKE $2 ESCAPE '\\') \
      AND ($3::BOOLEAN IS NULL OR shared = $3)";

/// Provides CRUD operations for address books.
pub struct AddressBookRepo;

impl AddressBookRepo {
    /// Insert an address book with a fresh guid.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        name: &str,
        owner: &str,
        note: &str,
        rule: i32,
        max_peer: i32,
        shared: bool,
    ) -> Result<AddressBook, sqlx::Error> {
        let query = format!(
            "INSERT INTO address_books (user_id, guid, name, owner, note, rule, max_peer, shared) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AddressBook>(&query)
            .bind(user_id)
            .bind(new_guid())
            .bind(name)
            .bind(owner)
            .bind(note)
            .bind(rule)
            .bind(max_peer)
            .bind(shared)
            .fetch_one(pool)
            .await
    }

    /// Create the user's personal address book unless it already exists,
    /// then return it. Concurrent callers converge on the same row.
    pub async fn ensure_personal(
        pool: &PgPool,
        user_id: DbId,
        owner: &str,
    ) -> Result<AddressBook, sqlx::Error> {
        sqlx::query(
            "INSERT INTO address_books (user_id, guid, name, owner, note, rule, max_peer) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT ON CONSTRAINT uq_address_books_user_name DO NOTHING",
        )
        .bind(user_id)
        .bind(new_guid())
        .bind(PERSONAL_ADDRESS_BOOK_NAME)
        .bind(owner)
        .bind(PERSONAL_ADDRESS_BOOK_NOTE)
        .bind(RULE_FULL_CONTROL)
        .bind(DEFAULT_MAX_PEER)
        .execute(pool)
        .await?;

        let query = format!("SELECT {COLUMNS} FROM address_books WHERE user_id = $1 AND name = $2");
        sqlx::query_as::<_, AddressBook>(&query)
            .bind(user_id)
            .bind(PERSONAL_ADDRESS_BOOK_NAME)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AddressBook>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM address_books WHERE id = $1");
        sqlx::query_as::<_, AddressBook>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_user_and_name(
        pool: &PgPool,
        user_id: DbId,
        name: &str,
    ) -> Result<Option<AddressBook>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM address_books WHERE user_id = $1 AND name = $2");
        sqlx::query_as::<_, AddressBook>(&query)
            .bind(user_id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// The user's personal address book, if one has been created.
    pub async fn find_personal(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<AddressBook>, sqlx::Error> {
        Self::find_by_user_and_name(pool, user_id, PERSONAL_ADDRESS_BOOK_NAME).await
    }

    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<AddressBook>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM address_books WHERE user_id = $1 ORDER BY id");
        sqlx::query_as::<_, AddressBook>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Console listing, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &AddressBookFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AddressBook>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM address_books {FILTER} \
             ORDER BY id DESC LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, AddressBook>(&query)
            .bind(filter.user_id)
            .bind(filter.name.as_deref().map(like_pattern))
            .bind(filter.shared)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &AddressBookFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM address_books {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(filter.user_id)
            .bind(filter.name.as_deref().map(like_pattern))
            .bind(filter.shared)
            .fetch_one(pool)
            .await
    }

    /// Address books flagged as shared, oldest first.
    pub async fn list_shared(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AddressBook>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM address_books WHERE shared \
             ORDER BY id LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, AddressBook>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_shared(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM address_books WHERE shared")
            .fetch_one(pool)
            .await
    }

    /// Patch an address book. Returns `None` if it does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAddressBook,
    ) -> Result<Option<AddressBook>, sqlx::Error> {
        let query = format!(
            "UPDATE address_books SET \
                 name = COALESCE($2, name), \
                 note = COALESCE($3, note), \
                 rule = COALESCE($4, rule), \
                 max_peer = COALESCE($5, max_peer), \
                 shared = COALESCE($6, shared) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AddressBook>(&query)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(input.note.as_deref())
            .bind(input.rule)
            .bind(input.max_peer)
            .bind(input.shared)
            .fetch_optional(pool)
            .await
    }

    /// Delete the address book row. Returns `true` if a row was removed.
    pub async fn delete_in_tx(tx: &mut PgTx<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM address_books WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Wrap user input in `%` for a substring `ILIKE ... ESCAPE '\'`.
///
/// `\`, `%` and `_` in the input match literally.
pub(crate) fn like_pattern(s: &str) -> String {
    let escaped = s
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
