//! Shared response envelope types for API handlers.
//!
//! Console responses use a `{ "data": ... }` envelope, and paginated lists add
//! the total row count. Use these instead of ad-hoc `serde_json::json!` bodies.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// One page of a list plus the total number of matching rows.
#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub total: i64,
    pub current: i64,
    pub size: i64,
    pub data: Vec<T>,
}
