//! Handlers for device heartbeats and the console device views.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use deskrelay_core::address_book::validate_rustdesk_id;
use deskrelay_db::models::device::{DeviceFilter, DeviceHeartbeat};
use deskrelay_db::repositories::DeviceRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::client_ip::ClientIp;
use crate::middleware::rbac::RequireStaff;
use crate::query::PageParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HeartbeatResponse {
    /// Unix timestamp of the stored heartbeat.
    pub modified_at: i64,
}

/// POST /api/v1/heartbeat
///
/// Device-facing and unauthenticated. Upserts the device by rustdesk id and
/// marks it online. Concurrent heartbeats are last-writer-wins.
pub async fn heartbeat(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(mut input): Json<DeviceHeartbeat>,
) -> AppResult<impl IntoResponse> {
    input.id = validate_rustdesk_id(&input.id)?;

    let device = DeviceRepo::upsert_heartbeat(&state.pool, &input, &ip, Utc::now()).await?;

    tracing::debug!(rustdesk_id = %device.rustdesk_id, ip = %device.ip_address, "Heartbeat recorded");

    Ok(Json(HeartbeatResponse {
        modified_at: device.updated_at.timestamp(),
    }))
}

/// GET /api/v1/admin/devices
///
/// Paginated list, online devices first. Filters: `hostname`, `username`,
/// `rustdesk_id` (substrings) and `status` (`online` / `offline`).
pub async fn list_devices(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<DeviceFilter>,
) -> AppResult<impl IntoResponse> {
    let window = page.window();
    let data = DeviceRepo::list(&state.pool, &filter, window.limit, window.offset).await?;
    let total = DeviceRepo::count(&state.pool, &filter).await?;

    Ok(Json(PageResponse {
        total,
        current: window.current,
        size: window.size,
        data,
    }))
}

/// GET /api/v1/admin/devices/online
///
/// Online devices, most recently seen first.
pub async fn list_online_devices(
    _staff: RequireStaff,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let devices = DeviceRepo::list_online(&state.pool).await?;

    Ok(Json(DataResponse { data: devices }))
}
