//! Handlers for the desktop client address book endpoints.
//!
//! The client exchanges its address book as a packed JSON string inside a
//! `data` field. Every endpoint acts on behalf of the authenticated
//! principal.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use deskrelay_core::address_book::{pack, unpack};
use deskrelay_core::error::CoreError;
use deskrelay_db::models::user::User;
use deskrelay_db::repositories::{AddressBookRepo, UserRepo};
use deskrelay_db::store::AddressBookStore;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `GET /ab`.
#[derive(Debug, Serialize)]
pub struct AbGetResponse {
    pub licensed_devices: i32,
    /// Packed `{ tags, peers, tag_colors }` JSON.
    pub data: String,
}

/// Body of `POST /ab`.
#[derive(Debug, Deserialize)]
pub struct AbUpdateRequest {
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct AbByNameParams {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct PersonalAbResponse {
    pub guid: String,
}

#[derive(Debug, Serialize)]
pub struct AbSettingsResponse {
    pub max_peer_one_ab: i32,
}

/// Load the principal's user row. A token for a deleted user is rejected.
async fn principal(state: &AppState, auth: &AuthUser) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Unknown user".into())))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/ab
///
/// The principal's address book: the personal book when one exists, the
/// legacy per-user tags and peers otherwise.
pub async fn get_address_book(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let user = principal(&state, &auth).await?;
    let contents = AddressBookStore::resolve_for_user(&state.pool, user.id).await?;

    Ok(Json(AbGetResponse {
        licensed_devices: user.licensed_devices,
        data: pack(&contents)?,
    }))
}

/// POST /api/v1/ab
///
/// Replace the principal's address book contents in one transaction.
pub async fn update_address_book(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<AbUpdateRequest>,
) -> AppResult<impl IntoResponse> {
    let user = principal(&state, &auth).await?;
    let contents = unpack(&input.data)?;

    AddressBookStore::replace_for_user(&state.pool, &user, &contents).await?;

    tracing::info!(
        user_id = user.id,
        tags = contents.tags.len(),
        peers = contents.peers.len(),
        "Client address book replaced"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/ab/get?name=
///
/// One of the principal's address books by name.
pub async fn get_address_book_by_name(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<AbByNameParams>,
) -> AppResult<impl IntoResponse> {
    let contents =
        AddressBookStore::resolve_by_name(&state.pool, auth.user_id, &params.name).await?;

    Ok(Json(DataResponse {
        data: pack(&contents)?,
    }))
}

/// POST /api/v1/ab/personal
///
/// Return the guid of the principal's personal address book, creating the
/// book on first use.
pub async fn ensure_personal(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let user = principal(&state, &auth).await?;
    let ab = AddressBookStore::ensure_personal(&state.pool, &user).await?;

    Ok(Json(PersonalAbResponse { guid: ab.guid }))
}

/// POST /api/v1/ab/settings
///
/// Peer cap of the principal's personal address book (`0` when none exists).
pub async fn settings(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let max_peer_one_ab = AddressBookRepo::find_personal(&state.pool, auth.user_id)
        .await?
        .map(|ab| ab.max_peer)
        .unwrap_or(0);

    Ok(Json(AbSettingsResponse { max_peer_one_ab }))
}

/// POST /api/v1/ab/shared/profiles
///
/// Paginated list of address books flagged as shared.
pub async fn shared_profiles(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    let window = page.window();
    let data = AddressBookRepo::list_shared(&state.pool, window.limit, window.offset).await?;
    let total = AddressBookRepo::count_shared(&state.pool).await?;

    Ok(Json(PageResponse {
        total,
        current: window.current,
        size: window.size,
        data,
    }))
}

/// GET /api/v1/ab/tags
///
/// Tags across all of the principal's address books, merged by first-seen
/// color.
pub async fn tags(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let tags = AddressBookStore::tag_summary(&state.pool, auth.user_id).await?;

    Ok(Json(DataResponse { data: tags }))
}
