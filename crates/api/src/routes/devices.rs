//! Console device routes, mounted at `/admin/devices`.

use axum::routing::get;
use axum::Router;

use crate::handlers::devices;
use crate::state::AppState;

/// ```text
/// GET    /          -> list_devices
/// GET    /online    -> list_online_devices
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(devices::list_devices))
        .route("/online", get(devices::list_online_devices))
}
