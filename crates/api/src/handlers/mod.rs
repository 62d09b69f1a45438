//! HTTP handlers grouped by resource.

pub mod ab;
pub mod address_books;
pub mod audit;
pub mod console;
pub mod devices;
pub mod kb;
pub mod tickets;
