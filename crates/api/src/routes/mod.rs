pub mod ab;
pub mod address_books;
pub mod audit;
pub mod devices;
pub mod health;
pub mod helpdesk;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /heartbeat                                       device heartbeat (public)
/// /audit/conn, /audit/file                         session recording (public)
///
/// /ab                                              client address book (auth)
/// /ab/get, /ab/personal, /ab/settings,
/// /ab/shared/profiles, /ab/tags
///
/// /admin/userinfo                                  console user (staff)
/// /admin/address-books                             address books, peers, tags (staff)
/// /admin/devices                                   device list, online devices (staff)
/// /admin/audit                                     audit log, file transfers, stats (staff)
///
/// /helpdesk/categories                             knowledge base categories
/// /helpdesk/articles                               knowledge base articles
/// /helpdesk/tickets                                tickets and comments
/// /helpdesk/stats                                  helpdesk figures (staff)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/heartbeat", post(handlers::devices::heartbeat))
        .nest("/audit", audit::recording_router())
        .nest("/ab", ab::router())
        .route("/admin/userinfo", get(handlers::console::userinfo))
        .nest("/admin/address-books", address_books::router())
        .nest("/admin/devices", devices::router())
        .nest("/admin/audit", audit::router())
        .nest("/helpdesk", helpdesk::router())
}
