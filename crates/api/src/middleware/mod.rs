//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Resolves the bearer token to a profile.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireSupervisor`] -- Requires `supervisor` or `admin` role.

pub mod auth;
pub mod rbac;
