//! Builds the per-request [`RoleDirectory`].

use apresiasi_core::roles::{RoleOverrides, RoleSnapshot};
use apresiasi_db::repositories::UserRoleRepo;
use sqlx::PgPool;

use crate::error::AppResult;

/// Load stored roles and merge the configured overrides on top.
pub async fn load_roles(pool: &PgPool, overrides: &RoleOverrides) -> AppResult<RoleSnapshot> {
    let stored = UserRoleRepo::list(pool).await?;
    Ok(RoleSnapshot::new(
        stored.into_iter().map(|r| (r.user_id, r.role)),
        overrides,
    ))
}
