//! Repository for the `assessment_periods` and `pin_periods` tables.

use apresiasi_core::period::PeriodKind;
use apresiasi_core::types::{Date, DbId};
use sqlx::PgPool;

use crate::models::period::{CreatePeriod, Period};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, month, year, start_date, end_date, is_active, is_completed, created_at";

fn table(kind: PeriodKind) -> &'static str {
    match kind {
        PeriodKind::Assessment => "assessment_periods",
        PeriodKind::Pin => "pin_periods",
    }
}

/// Provides CRUD and activation for both period tables.
pub struct PeriodRepo;

impl PeriodRepo {
    /// Insert a new, inactive period.
    pub async fn create(
        pool: &PgPool,
        kind: PeriodKind,
        input: &CreatePeriod,
    ) -> Result<Period, sqlx::Error> {
        let query = format!(
            "INSERT INTO {} (month, year, start_date, end_date)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}",
            table(kind)
        );
        sqlx::query_as::<_, Period>(&query)
            .bind(input.month)
            .bind(input.year)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        kind: PeriodKind,
        id: DbId,
    ) -> Result<Option<Period>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {} WHERE id = $1", table(kind));
        sqlx::query_as::<_, Period>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The single active period of this kind, if any.
    pub async fn find_active(
        pool: &PgPool,
        kind: PeriodKind,
    ) -> Result<Option<Period>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE is_active = true LIMIT 1",
            table(kind)
        );
        sqlx::query_as::<_, Period>(&query).fetch_optional(pool).await
    }

    /// A configured period labelled with this month and year.
    pub async fn find_for_month(
        pool: &PgPool,
        kind: PeriodKind,
        month: i32,
        year: i32,
    ) -> Result<Option<Period>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE month = $1 AND year = $2
             ORDER BY is_active DESC, start_date DESC LIMIT 1",
            table(kind)
        );
        sqlx::query_as::<_, Period>(&query)
            .bind(month)
            .bind(year)
            .fetch_optional(pool)
            .await
    }

    /// A period whose inclusive `[start_date, end_date]` contains `date`.
    ///
    /// Prefers the active period, then the most recently started one.
    pub async fn find_covering_date(
        pool: &PgPool,
        kind: PeriodKind,
        date: Date,
    ) -> Result<Option<Period>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE start_date <= $1 AND end_date >= $1
             ORDER BY is_active DESC, start_date DESC LIMIT 1",
            table(kind)
        );
        sqlx::query_as::<_, Period>(&query)
            .bind(date)
            .fetch_optional(pool)
            .await
    }

    /// List all periods of this kind, newest first.
    pub async fn list(pool: &PgPool, kind: PeriodKind) -> Result<Vec<Period>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} ORDER BY start_date DESC, id DESC",
            table(kind)
        );
        sqlx::query_as::<_, Period>(&query).fetch_all(pool).await
    }

    /// Make `id` the only active period of this kind.
    ///
    /// Every other row is deactivated first, in the same transaction.
    /// Returns `None` (and changes nothing) if no row with `id` exists.
    pub async fn activate(
        pool: &PgPool,
        kind: PeriodKind,
        id: DbId,
    ) -> Result<Option<Period>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let deactivate = format!(
            "UPDATE {} SET is_active = false WHERE is_active = true AND id <> $1",
            table(kind)
        );
        sqlx::query(&deactivate).bind(id).execute(&mut *tx).await?;

        let activate = format!(
            "UPDATE {} SET is_active = true, is_completed = false WHERE id = $1
             RETURNING {COLUMNS}",
            table(kind)
        );
        let period = sqlx::query_as::<_, Period>(&activate)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if period.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }
        tx.commit().await?;
        Ok(period)
    }

    /// Mark a period completed and inactive.
    pub async fn complete(
        pool: &PgPool,
        kind: PeriodKind,
        id: DbId,
    ) -> Result<Option<Period>, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET is_completed = true, is_active = false WHERE id = $1
             RETURNING {COLUMNS}",
            table(kind)
        );
        sqlx::query_as::<_, Period>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
