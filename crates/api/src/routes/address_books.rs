//! Console address book routes, mounted at `/admin/address-books`.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::address_books;
use crate::state::AppState;

/// ```text
/// GET    /                            -> list_address_books
/// POST   /                            -> create_address_book
/// GET    /merged                      -> merged_view
/// GET    /{id}                        -> get_address_book
/// PUT    /{id}                        -> update_address_book
/// DELETE /{id}                        -> delete_address_book
/// GET    /{id}/peers                  -> list_peers
/// POST   /{id}/peers                  -> add_peer
/// DELETE /{id}/peers/{peer_id}        -> delete_peer
/// POST   /{id}/import-devices         -> import_devices
/// GET    /{id}/tags                   -> list_tags
/// POST   /{id}/tags                   -> create_tag
/// DELETE /{id}/tags/{tag_id}          -> delete_tag
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(address_books::list_address_books).post(address_books::create_address_book),
        )
        .route("/merged", get(address_books::merged_view))
        .route(
            "/{id}",
            get(address_books::get_address_book)
                .put(address_books::update_address_book)
                .delete(address_books::delete_address_book),
        )
        .route(
            "/{id}/peers",
            get(address_books::list_peers).post(address_books::add_peer),
        )
        .route("/{id}/peers/{peer_id}", delete(address_books::delete_peer))
        .route("/{id}/import-devices", post(address_books::import_devices))
        .route(
            "/{id}/tags",
            get(address_books::list_tags).post(address_books::create_tag),
        )
        .route("/{id}/tags/{tag_id}", delete(address_books::delete_tag))
}
