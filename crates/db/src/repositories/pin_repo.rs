//! Repository for the `pins` table and the give/cancel transactions.
//!
//! Give, cancel and reconcile all lock the giver's allowance row with
//! `SELECT ... FOR UPDATE` before touching counters, so they serialize per
//! user and month and cannot over-grant.

use apresiasi_core::allowance::AllowanceBalance;
use apresiasi_core::types::{DbId, Timestamp};
use sqlx::{PgPool, Postgres, Transaction};

use super::allowance_repo::COLUMNS as ALLOWANCE_COLUMNS;
use crate::models::pin::{
    GiveOutcome, NewPin, Pin, PinAllowance, ReceivedCountRow, Reconciliation,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, giver_id, receiver_id, given_at, week_number, month, year, created_at";

/// Provides pin queries and the atomic give/cancel operations.
pub struct PinRepo;

impl PinRepo {
    /// Give a pin: lazily create the allowance row, then move one unit from
    /// remaining to used and insert the pin, all in one transaction.
    ///
    /// `quota` seeds a newly created allowance row. Returns
    /// [`GiveOutcome::Exhausted`] without writing anything if no pins remain.
    pub async fn give(pool: &PgPool, pin: &NewPin, quota: i32) -> Result<GiveOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "INSERT INTO pin_allowances (user_id, month, year, pins_remaining, pins_used)
             VALUES ($1, $2, $3, $4, 0)
             ON CONFLICT ON CONSTRAINT uq_pin_allowances_user_month_year DO NOTHING",
        )
        .bind(pin.giver_id)
        .bind(pin.month)
        .bind(pin.year)
        .bind(quota)
        .execute(&mut *tx)
        .await?;

        let allowance = lock_allowance(&mut tx, pin.giver_id, pin.month, pin.year)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let Ok(next) = allowance.balance().give() else {
            tx.rollback().await?;
            return Ok(GiveOutcome::Exhausted);
        };

        let insert = format!(
            "INSERT INTO pins (giver_id, receiver_id, given_at, week_number, month, year)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Pin>(&insert)
            .bind(pin.giver_id)
            .bind(pin.receiver_id)
            .bind(pin.given_at)
            .bind(pin.week_number)
            .bind(pin.month)
            .bind(pin.year)
            .fetch_one(&mut *tx)
            .await?;

        let allowance = write_balance(&mut tx, allowance.id, next).await?;

        tx.commit().await?;
        Ok(GiveOutcome::Granted {
            pin: created,
            allowance,
        })
    }

    /// Cancel a pin: delete it and credit one unit back to the allowance row
    /// for `(giver_id, month, year)`, in one transaction.
    ///
    /// If that allowance row does not exist it is created with
    /// `pins_remaining = seed_if_missing`. Returns `None` (nothing written)
    /// when no pin with `pin_id` belongs to `giver_id`.
    pub async fn cancel(
        pool: &PgPool,
        pin_id: DbId,
        giver_id: DbId,
        month: i32,
        year: i32,
        seed_if_missing: i32,
    ) -> Result<Option<PinAllowance>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM pins WHERE id = $1 AND giver_id = $2")
            .bind(pin_id)
            .bind(giver_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let allowance = match lock_allowance(&mut tx, giver_id, month, year).await? {
            Some(existing) => {
                write_balance(&mut tx, existing.id, existing.balance().cancel()).await?
            }
            None => {
                let insert = format!(
                    "INSERT INTO pin_allowances (user_id, month, year, pins_remaining, pins_used)
                     VALUES ($1, $2, $3, $4, 0)
                     RETURNING {ALLOWANCE_COLUMNS}"
                );
                sqlx::query_as::<_, PinAllowance>(&insert)
                    .bind(giver_id)
                    .bind(month)
                    .bind(year)
                    .bind(seed_if_missing)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        tx.commit().await?;
        Ok(Some(allowance))
    }

    /// Find a pin by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Pin>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pins WHERE id = $1");
        sqlx::query_as::<_, Pin>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Derive a user's balance from the pins they gave in `[start, end)` and
    /// rewrite the stored `(month, year)` row if it disagrees.
    ///
    /// The row is locked before the pins are counted, so a concurrent give
    /// either commits before the count or waits for the rewrite to commit.
    /// A missing row is left missing.
    pub async fn reconcile(
        pool: &PgPool,
        user_id: DbId,
        month: i32,
        year: i32,
        start: Timestamp,
        end: Timestamp,
        quota: i32,
    ) -> Result<Reconciliation, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let stored = lock_allowance(&mut tx, user_id, month, year).await?;

        let (given,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM pins WHERE giver_id = $1 AND given_at >= $2 AND given_at < $3",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(&mut *tx)
        .await?;
        let balance = AllowanceBalance::derived(quota, given);

        let drifted = match stored {
            Some(row) if row.balance() != balance => {
                write_balance(&mut tx, row.id, balance).await?;
                Some(row)
            }
            _ => None,
        };

        tx.commit().await?;
        Ok(Reconciliation { balance, drifted })
    }

    /// List pins a user gave in `[start, end)`, newest first.
    pub async fn list_given_between(
        pool: &PgPool,
        giver_id: DbId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Pin>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pins
             WHERE giver_id = $1 AND given_at >= $2 AND given_at < $3
             ORDER BY given_at DESC, id DESC"
        );
        sqlx::query_as::<_, Pin>(&query)
            .bind(giver_id)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await
    }

    /// Pins received per receiver in `[start, end)`.
    pub async fn count_received_between(
        pool: &PgPool,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<ReceivedCountRow>, sqlx::Error> {
        sqlx::query_as::<_, ReceivedCountRow>(
            "SELECT receiver_id, COUNT(*) AS pins_received FROM pins
             WHERE given_at >= $1 AND given_at < $2
             GROUP BY receiver_id",
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
    }
}

async fn lock_allowance(
    tx: &mut Transaction<'_, Postgres>,
    user_id: DbId,
    month: i32,
    year: i32,
) -> Result<Option<PinAllowance>, sqlx::Error> {
    let query = format!(
        "SELECT {ALLOWANCE_COLUMNS} FROM pin_allowances
         WHERE user_id = $1 AND month = $2 AND year = $3
         FOR UPDATE"
    );
    sqlx::query_as::<_, PinAllowance>(&query)
        .bind(user_id)
        .bind(month)
        .bind(year)
        .fetch_optional(&mut **tx)
        .await
}

async fn write_balance(
    tx: &mut Transaction<'_, Postgres>,
    allowance_id: DbId,
    balance: AllowanceBalance,
) -> Result<PinAllowance, sqlx::Error> {
    let query = format!(
        "UPDATE pin_allowances SET pins_remaining = $2, pins_used = $3
         WHERE id = $1
         RETURNING {ALLOWANCE_COLUMNS}"
    );
    sqlx::query_as::<_, PinAllowance>(&query)
        .bind(allowance_id)
        .bind(balance.pins_remaining)
        .bind(balance.pins_used)
        .fetch_one(&mut **tx)
        .await
}
