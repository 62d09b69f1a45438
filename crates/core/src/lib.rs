//! Domain logic for the deskrelay management backend.
//!
//! This crate has no database or HTTP dependencies. It holds the constants,
//! validation rules, wire-format packing and pure calculations shared by the
//! repository layer (`deskrelay-db`) and the server (`deskrelay-api`).

pub mod address_book;
pub mod error;
pub mod helpdesk;
pub mod json_list;
pub mod pagination;
pub mod roles;
pub mod sweep;
pub mod types;
