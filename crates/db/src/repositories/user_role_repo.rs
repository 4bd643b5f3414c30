//! Repository for the `user_roles` table.

use apresiasi_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::UserRole;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "user_id, role, created_at";

/// Provides read and upsert operations for user roles.
pub struct UserRoleRepo;

impl UserRoleRepo {
    /// List every stored role assignment.
    pub async fn list(pool: &PgPool) -> Result<Vec<UserRole>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_roles ORDER BY user_id ASC");
        sqlx::query_as::<_, UserRole>(&query).fetch_all(pool).await
    }

    /// Set a user's role, replacing any existing one.
    pub async fn set_role(
        pool: &PgPool,
        user_id: DbId,
        role: &str,
    ) -> Result<UserRole, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_roles (user_id, role) VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserRole>(&query)
            .bind(user_id)
            .bind(role)
            .fetch_one(pool)
            .await
    }
}
