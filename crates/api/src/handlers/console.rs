//! Console session information.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use deskrelay_core::error::CoreError;
use deskrelay_core::roles::role_name;
use deskrelay_core::types::DbId;
use deskrelay_db::repositories::UserRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub user_id: DbId,
    pub username: String,
    pub role: i32,
    pub role_name: &'static str,
}

/// GET /api/v1/admin/userinfo
///
/// The signed-in console user.
pub async fn userinfo(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, staff.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: staff.user_id,
        }))?;

    Ok(Json(DataResponse {
        data: UserInfo {
            user_id: user.id,
            username: user.username,
            role: staff.role,
            role_name: role_name(staff.role),
        },
    }))
}
