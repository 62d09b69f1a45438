//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated principal from a JWT Bearer token.
//! - [`rbac::RequireAuth`] -- Requires any authenticated user.
//! - [`rbac::RequireStaff`] -- Requires the console threshold (Support N2 or above).
//! - [`rbac::RequireSuperAdmin`] -- Requires the super admin role.
//! - [`client_ip::ClientIp`] -- Best-effort caller address for device heartbeats.

pub mod auth;
pub mod client_ip;
pub mod rbac;
