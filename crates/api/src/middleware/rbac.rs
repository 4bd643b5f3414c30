//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the minimum requirement. Roles come from the role table merged with
//! the configured overrides.

use apresiasi_core::error::CoreError;
use apresiasi_core::roles::RoleDirectory;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::roles::load_roles;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let roles = load_roles(&state.pool, &state.config.role_overrides).await?;
        if !roles.is_admin(user.profile_id) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires `supervisor` or `admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireSupervisor(pub AuthUser);

impl FromRequestParts<AppState> for RequireSupervisor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let roles = load_roles(&state.pool, &state.config.role_overrides).await?;
        if !roles.is_admin(user.profile_id) && !roles.is_supervisor(user.profile_id) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Supervisor or Admin role required".into(),
            )));
        }
        Ok(RequireSupervisor(user))
    }
}
