//! Address book, peer and tag models (shared and legacy).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use deskrelay_core::address_book::AbPeer;
use deskrelay_core::json_list;
use deskrelay_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `address_books` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AddressBook {
    pub id: DbId,
    pub user_id: DbId,
    pub guid: String,
    pub name: String,
    /// Owner username, copied from `users` at creation.
    pub owner: String,
    pub note: String,
    /// Access level, `0` (none) to `3` (full control).
    pub rule: i32,
    /// Peer cap applied at write time. `0` means unlimited.
    pub max_peer: i32,
    pub shared: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `peers` table.
///
/// `ab_id` is `None` for peers in the legacy per-user model.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Peer {
    pub id: DbId,
    pub user_id: DbId,
    pub ab_id: Option<DbId>,
    pub rustdesk_id: String,
    pub hash: String,
    pub username: String,
    pub hostname: String,
    pub platform: String,
    pub alias: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// JSON array of tag names.
    pub tags: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Peer {
    /// Convert to the client representation, decoding tags leniently.
    pub fn to_ab_peer(&self) -> AbPeer {
        AbPeer {
            id: self.rustdesk_id.clone(),
            hash: self.hash.clone(),
            username: self.username.clone(),
            hostname: self.hostname.clone(),
            platform: self.platform.clone(),
            alias: self.alias.clone(),
            tags: json_list::decode_or_default(&self.tags),
        }
    }
}

/// A peer joined with the presence of the device sharing its rustdesk id.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PeerWithPresence {
    pub id: DbId,
    pub ab_id: Option<DbId>,
    pub rustdesk_id: String,
    pub hash: String,
    pub username: String,
    pub hostname: String,
    pub platform: String,
    pub alias: String,
    #[serde(skip_serializing)]
    pub tags_json: String,
    pub created_at: Timestamp,
    /// `false` when no device with this rustdesk id exists.
    pub is_online: bool,
    pub last_seen_at: Option<Timestamp>,
    pub ip_address: Option<String>,
}

/// A row from the `address_book_tags` table. `color` is packed ARGB.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AddressBookTag {
    pub id: DbId,
    pub ab_id: DbId,
    pub name: String,
    pub color: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the legacy `tags` table. `color` is a decimal string.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LegacyTag {
    pub id: DbId,
    pub user_id: DbId,
    pub tag: String,
    pub color: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating an address book from the console.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAddressBook {
    pub user_id: DbId,
    pub name: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub rule: i32,
    #[serde(default)]
    pub max_peer: i32,
    #[serde(default)]
    pub shared: bool,
}

/// DTO for updating an address book. All fields optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAddressBook {
    pub name: Option<String>,
    pub note: Option<String>,
    pub rule: Option<i32>,
    pub max_peer: Option<i32>,
    pub shared: Option<bool>,
}

/// DTO for adding a peer to an address book from the console.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreatePeer {
    pub rustdesk_id: String,
    pub hash: String,
    pub username: String,
    pub hostname: String,
    pub platform: String,
    pub alias: String,
    pub password: Option<String>,
    /// Tag names. Unknown names are created with the default color.
    pub tags: Vec<String>,
}

/// DTO for creating a tag inside an address book.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAddressBookTag {
    pub name: String,
    pub color: Option<i64>,
}

/// Query parameters for the console address book list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressBookFilter {
    pub user_id: Option<DbId>,
    /// Substring match on the name.
    pub name: Option<String>,
    pub shared: Option<bool>,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of importing online devices into an address book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: i64,
    pub skipped: i64,
    pub total: i64,
}

/// A merged tag with its first-seen color, as returned by `/ab/tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagSummary {
    pub name: String,
    pub color: Option<i64>,
}
