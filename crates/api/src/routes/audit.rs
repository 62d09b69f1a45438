//! Audit routes.
//!
//! Two routers are provided:
//! - `recording_router()` for relay-facing writes mounted at `/audit`
//! - `router()` for console views mounted at `/admin/audit`

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::audit;
use crate::state::AppState;

/// Relay-facing recording routes mounted at `/audit`.
///
/// ```text
/// POST   /conn    -> record_connection
/// POST   /file    -> record_file_transfer
/// ```
pub fn recording_router() -> Router<AppState> {
    Router::new()
        .route("/conn", post(audit::record_connection))
        .route("/file", post(audit::record_file_transfer))
}

/// Console routes mounted at `/admin/audit`.
///
/// ```text
/// GET    /                  -> list_audits
/// GET    /file-transfers    -> list_file_transfers
/// GET    /stats             -> audit_stats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(audit::list_audits))
        .route("/file-transfers", get(audit::list_file_transfers))
        .route("/stats", get(audit::audit_stats))
}
