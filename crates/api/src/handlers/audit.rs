//! Handlers for session audit and file transfer records.
//!
//! Recording endpoints are called by the relay server without a user token.
//! The console views require the staff role.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use deskrelay_core::address_book::validate_rustdesk_id;
use deskrelay_db::models::audit::{AuditFilter, CreateAudit, CreateFileTransfer, FileTransferFilter};
use deskrelay_db::repositories::{AuditRepo, FileTransferRepo};

use crate::error::AppResult;
use crate::middleware::client_ip::ClientIp;
use crate::middleware::rbac::RequireStaff;
use crate::query::PageParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Recording
// ---------------------------------------------------------------------------

/// POST /api/v1/audit/conn
///
/// Record a remote-session connection. The caller's address fills `ip` when
/// the payload omits it.
pub async fn record_connection(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    Json(mut input): Json<CreateAudit>,
) -> AppResult<impl IntoResponse> {
    input.rustdesk_id = validate_rustdesk_id(&input.rustdesk_id)?;
    if input.ip.is_empty() {
        input.ip = client_ip;
    }

    let audit = AuditRepo::create(&state.pool, &input).await?;

    tracing::debug!(audit_id = audit.id, conn_id = audit.conn_id, rustdesk_id = %audit.rustdesk_id, "Connection recorded");

    Ok((StatusCode::CREATED, Json(DataResponse { data: audit })))
}

/// POST /api/v1/audit/file
pub async fn record_file_transfer(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    Json(mut input): Json<CreateFileTransfer>,
) -> AppResult<impl IntoResponse> {
    input.rustdesk_id = validate_rustdesk_id(&input.rustdesk_id)?;
    if input.ip.is_empty() {
        input.ip = client_ip;
    }

    let transfer = FileTransferRepo::create(&state.pool, &input).await?;

    tracing::debug!(transfer_id = transfer.id, rustdesk_id = %transfer.rustdesk_id, "File transfer recorded");

    Ok((StatusCode::CREATED, Json(DataResponse { data: transfer })))
}

// ---------------------------------------------------------------------------
// Console views
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/audit
///
/// Paginated connection log, newest first. Exact filters: `conn_id`, `type`,
/// `rustdesk_id`, `ip`, `session_id`, `uuid`. Ranges: `created_from`,
/// `created_to`, `closed_from`, `closed_to`.
pub async fn list_audits(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<AuditFilter>,
) -> AppResult<impl IntoResponse> {
    let window = page.window();
    let data = AuditRepo::list(&state.pool, &filter, window.limit, window.offset).await?;
    let total = AuditRepo::count(&state.pool, &filter).await?;

    Ok(Json(PageResponse {
        total,
        current: window.current,
        size: window.size,
        data,
    }))
}

/// GET /api/v1/admin/audit/file-transfers
pub async fn list_file_transfers(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<FileTransferFilter>,
) -> AppResult<impl IntoResponse> {
    let window = page.window();
    let data = FileTransferRepo::list(&state.pool, &filter, window.limit, window.offset).await?;
    let total = FileTransferRepo::count(&state.pool, &filter).await?;

    Ok(Json(PageResponse {
        total,
        current: window.current,
        size: window.size,
        data,
    }))
}

/// GET /api/v1/admin/audit/stats
pub async fn audit_stats(
    _staff: RequireStaff,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let stats = AuditRepo::stats(&state.pool, Utc::now()).await?;

    Ok(Json(DataResponse { data: stats }))
}
