//! Repository for the `pin_allowances` table.
//!
//! Give and cancel mutate allowances inside [`PinRepo`](super::PinRepo)
//! transactions; this repo covers direct reads and seeding.

use apresiasi_core::types::DbId;
use sqlx::PgPool;

use crate::models::pin::{CreateAllowance, PinAllowance};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str =
    "id, user_id, month, year, pins_remaining, pins_used, created_at, updated_at";

/// Provides read and seed operations for allowance rows.
pub struct AllowanceRepo;

impl AllowanceRepo {
    /// Insert an allowance row with explicit counters.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAllowance,
    ) -> Result<PinAllowance, sqlx::Error> {
        let query = format!(
            "INSERT INTO pin_allowances (user_id, month, year, pins_remaining, pins_used)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PinAllowance>(&query)
            .bind(input.user_id)
            .bind(input.month)
            .bind(input.year)
            .bind(input.pins_remaining)
            .bind(input.pins_used)
            .fetch_one(pool)
            .await
    }

    /// Find the allowance row for a user and month.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        month: i32,
        year: i32,
    ) -> Result<Option<PinAllowance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pin_allowances WHERE user_id = $1 AND month = $2 AND year = $3"
        );
        sqlx::query_as::<_, PinAllowance>(&query)
            .bind(user_id)
            .bind(month)
            .bind(year)
            .fetch_optional(pool)
            .await
    }
}
