//! Console handlers for address books, their peers and their tags.
//!
//! All endpoints require the staff role.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use deskrelay_core::json_list;
use deskrelay_core::types::DbId;
use deskrelay_db::models::address_book::{
    AddressBookFilter, CreateAddressBook, CreateAddressBookTag, CreatePeer, PeerWithPresence,
    UpdateAddressBook,
};
use deskrelay_db::repositories::{AddressBookRepo, AddressBookTagRepo, PeerRepo};
use deskrelay_db::store::AddressBookStore;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireStaff;
use crate::query::PageParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// A peer with device presence and its tag list decoded.
#[derive(Debug, Serialize)]
pub struct PeerView {
    #[serde(flatten)]
    pub peer: PeerWithPresence,
    pub tags: Vec<String>,
}

impl From<PeerWithPresence> for PeerView {
    fn from(peer: PeerWithPresence) -> Self {
        let tags = json_list::decode_or_default(&peer.tags_json);
        Self { peer, tags }
    }
}

// ---------------------------------------------------------------------------
// Address books
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/address-books
///
/// Paginated list, newest first. Filters: `user_id`, `name` (substring), `shared`.
pub async fn list_address_books(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<AddressBookFilter>,
) -> AppResult<impl IntoResponse> {
    let window = page.window();
    let data = AddressBookRepo::list(&state.pool, &filter, window.limit, window.offset).await?;
    let total = AddressBookRepo::count(&state.pool, &filter).await?;

    Ok(Json(PageResponse {
        total,
        current: window.current,
        size: window.size,
        data,
    }))
}

/// GET /api/v1/admin/address-books/{id}
pub async fn get_address_book(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(ab_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ab = AddressBookStore::find(&state.pool, ab_id).await?;

    Ok(Json(DataResponse { data: ab }))
}

/// POST /api/v1/admin/address-books
pub async fn create_address_book(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Json(input): Json<CreateAddressBook>,
) -> AppResult<impl IntoResponse> {
    let ab = AddressBookStore::create_address_book(&state.pool, &input).await?;

    tracing::info!(ab_id = ab.id, owner_id = ab.user_id, user_id = staff.user_id, "Address book created from console");

    Ok((StatusCode::CREATED, Json(DataResponse { data: ab })))
}

/// PUT /api/v1/admin/address-books/{id}
pub async fn update_address_book(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(ab_id): Path<DbId>,
    Json(input): Json<UpdateAddressBook>,
) -> AppResult<impl IntoResponse> {
    let ab = AddressBookStore::update_address_book(&state.pool, ab_id, &input).await?;

    tracing::info!(ab_id, user_id = staff.user_id, "Address book updated");

    Ok(Json(DataResponse { data: ab }))
}

/// DELETE /api/v1/admin/address-books/{id}
///
/// Removes the address book together with its peers and tags.
pub async fn delete_address_book(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(ab_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    AddressBookStore::delete_address_book(&state.pool, ab_id).await?;

    tracing::info!(ab_id, user_id = staff.user_id, "Address book deleted from console");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/address-books/merged
///
/// Tags and peers merged across every address book.
pub async fn merged_view(
    _staff: RequireStaff,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let contents = AddressBookStore::resolve_shared(&state.pool).await?;

    Ok(Json(DataResponse { data: contents }))
}

// ---------------------------------------------------------------------------
// Peers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/address-books/{id}/peers
///
/// Paginated peers, each with the online status of its device.
pub async fn list_peers(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(ab_id): Path<DbId>,
    Query(page): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    AddressBookStore::find(&state.pool, ab_id).await?;

    let window = page.window();
    let peers = PeerRepo::list_with_presence(&state.pool, ab_id, window.limit, window.offset).await?;
    let total = PeerRepo::count_by_ab(&state.pool, ab_id).await?;

    Ok(Json(PageResponse {
        total,
        current: window.current,
        size: window.size,
        data: peers.into_iter().map(PeerView::from).collect(),
    }))
}

/// POST /api/v1/admin/address-books/{id}/peers
pub async fn add_peer(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(ab_id): Path<DbId>,
    Json(input): Json<CreatePeer>,
) -> AppResult<impl IntoResponse> {
    let peer = AddressBookStore::add_peer(&state.pool, ab_id, &input).await?;

    tracing::info!(ab_id, peer_id = peer.id, user_id = staff.user_id, "Peer added from console");

    Ok((StatusCode::CREATED, Json(DataResponse { data: peer })))
}

/// DELETE /api/v1/admin/address-books/{id}/peers/{peer_id}
pub async fn delete_peer(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path((ab_id, peer_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    AddressBookStore::delete_peer(&state.pool, ab_id, peer_id).await?;

    tracing::info!(ab_id, peer_id, user_id = staff.user_id, "Peer removed from address book");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/address-books/{id}/import-devices
///
/// Copy every online device into the address book. Best effort.
pub async fn import_devices(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(ab_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let summary = AddressBookStore::import_devices(&state.pool, ab_id).await?;

    Ok(Json(DataResponse { data: summary }))
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/address-books/{id}/tags
pub async fn list_tags(
    _staff: RequireStaff,
    State(state): State<AppState>,
    Path(ab_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    AddressBookStore::find(&state.pool, ab_id).await?;
    let tags = AddressBookTagRepo::list_by_ab(&state.pool, ab_id).await?;

    Ok(Json(DataResponse { data: tags }))
}

/// POST /api/v1/admin/address-books/{id}/tags
pub async fn create_tag(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(ab_id): Path<DbId>,
    Json(input): Json<CreateAddressBookTag>,
) -> AppResult<impl IntoResponse> {
    let tag = AddressBookStore::create_tag(&state.pool, ab_id, &input).await?;

    tracing::info!(ab_id, tag_id = tag.id, user_id = staff.user_id, "Address book tag created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: tag })))
}

/// DELETE /api/v1/admin/address-books/{id}/tags/{tag_id}
///
/// Peers keep the tag name; it simply loses its color.
pub async fn delete_tag(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path((ab_id, tag_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    AddressBookStore::delete_tag(&state.pool, ab_id, tag_id).await?;

    tracing::info!(ab_id, tag_id, user_id = staff.user_id, "Address book tag deleted");

    Ok(StatusCode::NO_CONTENT)
}
