//! Shared query parameter types for API handlers.

use deskrelay_core::pagination::{page_window, PageWindow, DEFAULT_PAGE_SIZE};
use serde::Deserialize;

/// Page-number pagination parameters (`?current=&size=`).
///
/// `pageSize` is accepted as an alias of `size` for the desktop client.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub current: Option<i64>,
    #[serde(alias = "pageSize")]
    pub size: Option<i64>,
}

impl PageParams {
    /// Resolve to a clamped limit/offset window.
    pub fn window(&self) -> PageWindow {
        page_window(self.current, self.size, DEFAULT_PAGE_SIZE)
    }
}
