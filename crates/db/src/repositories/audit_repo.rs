//! Repository for the `audits` table (remote-session connections).

use sqlx::postgres::PgArguments;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::{PgPool, Postgres};
use deskrelay_core::types::Timestamp;

use crate::models::audit::{
    Audit, AuditFilter, AuditStats, CreateAudit, DailyConnectionCount, DeviceConnectionCount,
    UserConnectionCount,
};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Select list for `audits a LEFT JOIN users u`.
const COLUMNS: &str = "\
    a.id, a.user_id, COALESCE(u.username, '-') AS username, a.conn_id, \
    a.rustdesk_id, a.ip, a.session_id, a.uuid, a.conn_type, a.note, \
    a.created_at, a.closed_at";

/// Binds `$1`..`$10`; each condition is ignored when its parameter is NULL.
const FILTER: &str = "\
    WHERE ($1::BIGINT IS NULL OR a.conn_id = $1) \
      AND ($2::INTEGER IS NULL OR a.conn_type = $2) \
      AND ($3::TEXT IS NULL OR a.rustdesk_id = $3) \
      AND ($4::TEXT IS NULL OR a.ip = $4) \
      AND ($5::TEXT IS NULL OR a.session_id = $5) \
      AND ($6::TEXT IS NULL OR a.uuid = $6) \
      AND ($7::TIMESTAMPTZ IS NULL OR a.created_at >= $7) \
      AND ($8::TIMESTAMPTZ IS NULL OR a.created_at <= $8) \
      AND ($9::TIMESTAMPTZ IS NULL OR a.closed_at >= $9) \
      AND ($10::TIMESTAMPTZ IS NULL OR a.closed_at <= $10)";

/// A session is open when `closed_at` is NULL or holds the zero-value
/// sentinel `0001-01-01 00:00:00`. Any instant before 0001-01-02 counts as
/// the sentinel regardless of the offset it was written with.
const OPEN_SESSION: &str =
    "(closed_at IS NULL OR closed_at < TIMESTAMPTZ '0001-01-02 00:00:00+00')";

/// Number of entries in the top-devices and top-users lists.
const TOP_N: i64 = 10;

/// Days covered by the daily connection histogram, including today.
const DAILY_WINDOW_DAYS: i64 = 7;

// ---------------------------------------------------------------------------
// AuditRepo
// ---------------------------------------------------------------------------

/// Provides queries and the timeout sweep for session audit rows.
pub struct AuditRepo;

impl AuditRepo {
    /// Record a session connection.
    pub async fn create(pool: &PgPool, input: &CreateAudit) -> Result<Audit, sqlx::Error> {
        let query = format!(
            "WITH a AS ( \
                 INSERT INTO audits \
                     (user_id, conn_id, rustdesk_id, ip, session_id, uuid, conn_type, created_at, closed_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, NOW()), $9) \
                 RETURNING * \
             ) \
             SELECT {COLUMNS} FROM a LEFT JOIN users u ON u.id = a.user_id"
        );
        sqlx::query_as::<_, Audit>(&query)
            .bind(input.user_id)
            .bind(input.conn_id)
            .bind(&input.rustdesk_id)
            .bind(&input.ip)
            .bind(&input.session_id)
            .bind(&input.uuid)
            .bind(input.conn_type)
            .bind(input.created_at)
            .bind(input.closed_at)
            .fetch_one(pool)
            .await
    }

    /// Filtered listing, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &AuditFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Audit>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audits a LEFT JOIN users u ON u.id = a.user_id {FILTER} \
             ORDER BY a.created_at DESC, a.id DESC \
             LIMIT $11 OFFSET $12"
        );
        bind_filter(sqlx::query_as::<_, Audit>(&query), filter)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &AuditFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM audits a {FILTER}");
        bind_filter_scalar(sqlx::query_scalar::<_, i64>(&query), filter)
            .fetch_one(pool)
            .await
    }

    /// Close every open session created at or before `cutoff`, stamping
    /// `closed_at = now` and `note`.
    ///
    /// Returns the number of sessions closed. Rows already closed and rows
    /// newer than the cutoff are never touched, so repeated runs are no-ops.
    pub async fn close_stale_sessions(
        pool: &PgPool,
        cutoff: Timestamp,
        now: Timestamp,
        note: &str,
    ) -> Result<u64, sqlx::Error> {
        let query = format!(
            "UPDATE audits SET closed_at = $2, note = $3 \
             WHERE {OPEN_SESSION} AND created_at <= $1"
        );
        let result = sqlx::query(&query)
            .bind(cutoff)
            .bind(now)
            .bind(note)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Dashboard aggregates. The daily histogram covers the seven UTC days
    /// ending on `now`.
    pub async fn stats(pool: &PgPool, now: Timestamp) -> Result<AuditStats, sqlx::Error> {
        let top_devices = sqlx::query_as::<_, DeviceConnectionCount>(
            "SELECT rustdesk_id, COUNT(*)::BIGINT AS count FROM audits \
             GROUP BY rustdesk_id \
             ORDER BY count DESC, rustdesk_id \
             LIMIT $1",
        )
        .bind(TOP_N)
        .fetch_all(pool)
        .await?;

        let top_users = sqlx::query_as::<_, UserConnectionCount>(
            "SELECT a.user_id, COALESCE(u.username, '-') AS username, COUNT(*)::BIGINT AS count \
             FROM audits a LEFT JOIN users u ON u.id = a.user_id \
             WHERE a.user_id IS NOT NULL \
             GROUP BY a.user_id, u.username \
             ORDER BY count DESC, a.user_id \
             LIMIT $1",
        )
        .bind(TOP_N)
        .fetch_all(pool)
        .await?;

        let avg_session_secs = sqlx::query_scalar::<_, f64>(
            "SELECT COALESCE(AVG(EXTRACT(EPOCH FROM (closed_at - created_at))), 0)::FLOAT8 \
             FROM audits \
             WHERE closed_at >= TIMESTAMPTZ '0001-01-02 00:00:00+00' \
               AND closed_at >= created_at",
        )
        .fetch_one(pool)
        .await?;

        let window_start = (now - chrono::Duration::days(DAILY_WINDOW_DAYS - 1))
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or(now);

        let daily = sqlx::query_as::<_, DailyConnectionCount>(
            "SELECT (created_at AT TIME ZONE 'UTC')::DATE AS day, COUNT(*)::BIGINT AS count \
             FROM audits \
             WHERE created_at >= $1 \
             GROUP BY day \
             ORDER BY day",
        )
        .bind(window_start)
        .fetch_all(pool)
        .await?;

        let total_connections = sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM audits")
            .fetch_one(pool)
            .await?;

        Ok(AuditStats {
            top_devices,
            top_users,
            avg_session_secs,
            daily,
            total_connections,
        })
    }
}

// ---------------------------------------------------------------------------
// Filter binding
// ---------------------------------------------------------------------------

fn bind_filter<'q, O>(
    q: QueryAs<'q, Postgres, O, PgArguments>,
    f: &'q AuditFilter,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    q.bind(f.conn_id)
        .bind(f.conn_type)
        .bind(f.rustdesk_id.as_deref())
        .bind(f.ip.as_deref())
        .bind(f.session_id.as_deref())
        .bind(f.uuid.as_deref())
        .bind(f.created_from)
        .bind(f.created_to)
        .bind(f.closed_from)
        .bind(f.closed_to)
}

fn bind_filter_scalar<'q, O>(
    q: QueryScalar<'q, Postgres, O, PgArguments>,
    f: &'q AuditFilter,
) -> QueryScalar<'q, Postgres, O, PgArguments> {
    q.bind(f.conn_id)
        .bind(f.conn_type)
        .bind(f.rustdesk_id.as_deref())
        .bind(f.ip.as_deref())
        .bind(f.session_id.as_deref())
        .bind(f.uuid.as_deref())
        .bind(f.created_from)
        .bind(f.created_to)
        .bind(f.closed_from)
        .bind(f.closed_to)
}
