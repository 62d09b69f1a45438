//! Repository for the `file_transfers` table.

use sqlx::PgPool;

use crate::models::audit::{CreateFileTransfer, FileTransfer, FileTransferFilter};

const COLUMNS: &str = "\
    f.id, f.user_id, COALESCE(u.username, '-') AS username, f.rustdesk_id, \
    f.peer_id, f.path, f.uuid, f.is_file, f.transfer_type, f.ip, f.created_at";

const FILTER: &str = "\
    WHERE ($1::INTEGER IS NULL OR f.transfer_type = $1) \
      AND ($2::TEXT IS NULL OR f.rustdesk_id = $2) \
      AND ($3::TEXT IS NULL OR f.peer_id = $3) \
      AND ($4::TEXT IS NULL OR f.uuid = $4) \
      AND ($5::TIMESTAMPTZ IS NULL OR f.created_at >= $5) \
      AND ($6::TIMESTAMPTZ IS NULL OR f.created_at <= $6)";

pub struct FileTransferRepo;

impl FileTransferRepo {
    pub async fn create(pool: &PgPool, input: &CreateFileTransfer) -> Result<FileTransfer, sqlx::Error> {
        let query = format!(
            "WITH f AS ( \
                 INSERT INTO file_transfers \
                     (user_id, rustdesk_id, peer_id, path, uuid, is_file, transfer_type, ip) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                 RETURNING * \
             ) \
             SELECT {COLUMNS} FROM f LEFT JOIN users u ON u.id = f.user_id"
        );
        sqlx::query_as::<_, FileTransfer>(&query)
            .bind(input.user_id)
            .bind(&input.rustdesk_id)
            .bind(&input.peer_id)
            .bind(&input.path)
            .bind(&input.uuid)
            .bind(input.is_file)
            .bind(input.transfer_type)
            .bind(&input.ip)
            .fetch_one(pool)
            .await
    }

    /// Filtered listing, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &FileTransferFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FileTransfer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM file_transfers f LEFT JOIN users u ON u.id = f.user_id {FILTER} \
             ORDER BY f.created_at DESC, f.id DESC \
             LIMIT $7 OFFSET $8"
        );
        sqlx::query_as::<_, FileTransfer>(&query)
            .bind(filter.transfer_type)
            .bind(filter.rustdesk_id.as_deref())
            .bind(filter.peer_id.as_deref())
            .bind(filter.uuid.as_deref())
            .bind(filter.created_from)
            .bind(filter.created_to)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &FileTransferFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM file_transfers f {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(filter.transfer_type)
            .bind(filter.rustdesk_id.as_deref())
            .bind(filter.peer_id.as_deref())
            .bind(filter.uuid.as_deref())
            .bind(filter.created_from)
            .bind(filter.created_to)
            .fetch_one(pool)
            .await
    }
}
