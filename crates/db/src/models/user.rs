//! Console user model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use deskrelay_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub name: String,
    pub email: String,
    /// Peer cap for the legacy address book payload. `0` means unlimited.
    pub licensed_devices: i32,
    pub role: i32,
    pub status: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for provisioning a user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub licensed_devices: i32,
    pub role: i32,
}
