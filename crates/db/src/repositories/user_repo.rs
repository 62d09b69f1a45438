//! Repository for the `users` table.

use sqlx::PgPool;
use deskrelay_core::types::DbId;

use crate::models::user::{CreateUser, User};

const COLUMNS: &str = "\
    id, username, name, email, licensed_devices, role, status, \
    created_at, updated_at";

/// Provides lookups and provisioning for console users.
pub struct UserRepo;

impl UserRepo {
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, name, email, licensed_devices, role) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.licensed_devices)
            .bind(input.role)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
