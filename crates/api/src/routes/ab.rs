//! Route definitions for the desktop client address book, mounted at `/ab`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::ab;
use crate::state::AppState;

/// ```text
/// GET    /                   -> get_address_book
/// POST   /                   -> update_address_book
/// GET    /get?name=          -> get_address_book_by_name
/// POST   /personal           -> ensure_personal
/// GET    /settings           -> settings
/// POST   /settings           -> settings
/// GET    /shared/profiles    -> shared_profiles
/// POST   /shared/profiles    -> shared_profiles
/// GET    /tags               -> tags
/// POST   /tags               -> tags
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(ab::get_address_book).post(ab::update_address_book))
        .route("/get", get(ab::get_address_book_by_name))
        .route("/personal", post(ab::ensure_personal))
        .route("/settings", get(ab::settings).post(ab::settings))
        .route(
            "/shared/profiles",
            get(ab::shared_profiles).post(ab::shared_profiles),
        )
        .route("/tags", get(ab::tags).post(ab::tags))
}
