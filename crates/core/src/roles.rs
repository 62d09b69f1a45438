//! Console role levels.
//!
//! Roles are ordered integers: a principal satisfies a requirement when its
//! level is greater than or equal to the required level. The values must
//! match the `CHECK` constraint on `users.role`.

pub const ROLE_USER: i32 = 1;
pub const ROLE_SUPPORT: i32 = 2;
pub const ROLE_SUPPORT_N2: i32 = 3;
pub const ROLE_SUPER_ADMIN: i32 = 4;

/// Minimum level for the administration console and helpdesk staff actions.
pub const ROLE_STAFF: i32 = ROLE_SUPPORT_N2;

/// Whether `role` meets or exceeds `required`.
pub fn has_level(role: i32, required: i32) -> bool {
    role >= required
}

/// Whether `role` may use the administration console.
pub fn is_staff(role: i32) -> bool {
    has_level(role, ROLE_STAFF)
}

/// Human-readable role name, used in log lines.
pub fn role_name(role: i32) -> &'static str {
    match role {
        ROLE_USER => "user",
        ROLE_SUPPORT => "support",
        ROLE_SUPPORT_N2 => "support_n2",
        ROLE_SUPER_ADMIN => "super_admin",
        _ => "unknown",
    }
}
