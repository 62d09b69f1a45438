//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods that must run
//! inside a caller's transaction take `&mut Transaction` instead and carry
//! an `_in_tx` suffix.

pub mod address_book_repo;
pub mod address_book_tag_repo;
pub mod audit_repo;
pub mod device_repo;
pub mod file_transfer_repo;
pub mod kb_article_repo;
pub mod kb_category_repo;
pub mod legacy_tag_repo;
pub mod peer_repo;
pub mod ticket_comment_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use address_book_repo::AddressBookRepo;
pub use address_book_tag_repo::AddressBookTagRepo;
pub use audit_repo::AuditRepo;
pub use device_repo::DeviceRepo;
pub use file_transfer_repo::FileTransferRepo;
pub use kb_article_repo::KbArticleRepo;
pub use kb_category_repo::KbCategoryRepo;
pub use legacy_tag_repo::LegacyTagRepo;
pub use peer_repo::PeerRepo;
pub use ticket_comment_repo::TicketCommentRepo;
pub use ticket_repo::TicketRepo;
pub use user_repo::UserRepo;

/// Transaction handle used by `_in_tx` repository methods.
pub type PgTx<'c> = sqlx::Transaction<'c, sqlx::Postgres>;
