//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` create/update DTOs for request bodies
//! - `Deserialize` filter structs for list endpoints

pub mod address_book;
pub mod audit;
pub mod device;
pub mod helpdesk;
pub mod user;
