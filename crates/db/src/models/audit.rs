//! Remote-session audit and file transfer models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use deskrelay_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `audits` table joined with the owning username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Audit {
    pub id: DbId,
    pub user_id: Option<DbId>,
    /// `"-"` when the row has no user or the user no longer exists.
    pub username: String,
    pub conn_id: i64,
    pub rustdesk_id: String,
    pub ip: String,
    pub session_id: String,
    pub uuid: String,
    #[serde(rename = "type")]
    pub conn_type: i32,
    pub note: String,
    pub created_at: Timestamp,
    pub closed_at: Option<Timestamp>,
}

/// DTO for recording a session connection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateAudit {
    pub user_id: Option<DbId>,
    pub conn_id: i64,
    pub rustdesk_id: String,
    pub ip: String,
    pub session_id: String,
    pub uuid: String,
    #[serde(alias = "type")]
    pub conn_type: i32,
    /// Defaults to now when absent.
    pub created_at: Option<Timestamp>,
    pub closed_at: Option<Timestamp>,
}

/// A row from the `file_transfers` table joined with the owning username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FileTransfer {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub username: String,
    pub rustdesk_id: String,
    pub peer_id: String,
    pub path: String,
    pub uuid: String,
    pub is_file: bool,
    #[serde(rename = "type")]
    pub transfer_type: i32,
    pub ip: String,
    pub created_at: Timestamp,
}

/// DTO for recording a file transfer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateFileTransfer {
    pub user_id: Option<DbId>,
    pub rustdesk_id: String,
    pub peer_id: String,
    pub path: String,
    pub uuid: String,
    pub is_file: bool,
    #[serde(alias = "type")]
    pub transfer_type: i32,
    pub ip: String,
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Exact-match filters and time ranges for the audit list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditFilter {
    pub conn_id: Option<i64>,
    #[serde(rename = "type")]
    pub conn_type: Option<i32>,
    pub rustdesk_id: Option<String>,
    pub ip: Option<String>,
    pub session_id: Option<String>,
    pub uuid: Option<String>,
    pub created_from: Option<Timestamp>,
    pub created_to: Option<Timestamp>,
    pub closed_from: Option<Timestamp>,
    pub closed_to: Option<Timestamp>,
}

/// Filters for the file transfer list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileTransferFilter {
    #[serde(rename = "type")]
    pub transfer_type: Option<i32>,
    pub rustdesk_id: Option<String>,
    pub peer_id: Option<String>,
    pub uuid: Option<String>,
    pub created_from: Option<Timestamp>,
    pub created_to: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Connection count for one device.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeviceConnectionCount {
    pub rustdesk_id: String,
    pub count: i64,
}

/// Connection count for one user.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserConnectionCount {
    pub user_id: DbId,
    pub username: String,
    pub count: i64,
}

/// Connection count for one calendar day (UTC).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyConnectionCount {
    pub day: chrono::NaiveDate,
    pub count: i64,
}

/// Aggregate connection statistics for the console dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct AuditStats {
    pub top_devices: Vec<DeviceConnectionCount>,
    pub top_users: Vec<UserConnectionCount>,
    /// Mean duration of closed sessions in seconds; `0` when none are closed.
    pub avg_session_secs: f64,
    pub daily: Vec<DailyConnectionCount>,
    pub total_connections: i64,
}
