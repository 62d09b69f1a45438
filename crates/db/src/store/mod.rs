//! Address book store.
//!
//! Multi-step address book operations that combine several repositories,
//! validate before mutating, and run their writes in a single transaction
//! where atomicity is required.

mod address_book_store;
mod view;

pub use address_book_store::AddressBookStore;
pub use view::AddressBookView;

use deskrelay_core::error::CoreError;

/// Failure of a store operation: either a domain rule rejected it before
/// any write, or the database failed (and any transaction rolled back).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
