//! Page-number pagination helpers.
//!
//! The console paginates with `current` (1-based page) and `size`; the
//! repositories work with `LIMIT`/`OFFSET`. These helpers convert between
//! the two and clamp user input to sane bounds.

/// Default page size when the caller does not provide one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: i64 = 200;

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// A resolved page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page number after clamping.
    pub current: i64,
    /// Page size after clamping.
    pub size: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Convert `current`/`size` query values into a clamped [`PageWindow`].
///
/// Pages start at 1; anything lower is treated as the first page.
pub fn page_window(current: Option<i64>, size: Option<i64>, default_size: i64) -> PageWindow {
    let current = current.unwrap_or(1).max(1);
    let size = clamp_limit(size, default_size, MAX_PAGE_SIZE);
    let offset = (current - 1).saturating_mul(size);
    PageWindow {
        current,
        size,
        limit: size,
        offset,
    }
}
