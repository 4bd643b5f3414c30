//! Pin and pin allowance entity models.

use apresiasi_core::allowance::AllowanceBalance;
use apresiasi_core::ranking::ReceivedCount;
use apresiasi_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Pins
// ---------------------------------------------------------------------------

/// A row from the `pins` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Pin {
    pub id: DbId,
    pub giver_id: DbId,
    pub receiver_id: DbId,
    pub given_at: Timestamp,
    pub week_number: i32,
    pub month: i32,
    pub year: i32,
    pub created_at: Timestamp,
}

/// Everything needed to insert a pin; `month`/`year` key the allowance row.
#[derive(Debug, Clone)]
pub struct NewPin {
    pub giver_id: DbId,
    pub receiver_id: DbId,
    pub given_at: Timestamp,
    pub week_number: i32,
    pub month: i32,
    pub year: i32,
}

/// Request body for `POST /pins`.
#[derive(Debug, Deserialize)]
pub struct GivePinRequest {
    pub receiver_id: DbId,
}

/// Pins received per receiver in a window (grouped count).
#[derive(Debug, Clone, FromRow)]
pub struct ReceivedCountRow {
    pub receiver_id: DbId,
    pub pins_received: i64,
}

impl From<ReceivedCountRow> for ReceivedCount {
    fn from(row: ReceivedCountRow) -> Self {
        ReceivedCount {
            receiver_id: row.receiver_id,
            pins_received: row.pins_received,
        }
    }
}

// ---------------------------------------------------------------------------
// Allowances
// ---------------------------------------------------------------------------

/// A row from the `pin_allowances` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PinAllowance {
    pub id: DbId,
    pub user_id: DbId,
    pub month: i32,
    pub year: i32,
    pub pins_remaining: i32,
    pub pins_used: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PinAllowance {
    pub fn balance(&self) -> AllowanceBalance {
        AllowanceBalance {
            pins_remaining: self.pins_remaining,
            pins_used: self.pins_used,
        }
    }
}

/// DTO for seeding an allowance row directly.
#[derive(Debug, Clone)]
pub struct CreateAllowance {
    pub user_id: DbId,
    pub month: i32,
    pub year: i32,
    pub pins_remaining: i32,
    pub pins_used: i32,
}

/// Result of reconciling a stored allowance row with the pins actually given.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// Balance derived from the pin rows.
    pub balance: AllowanceBalance,
    /// The stored row as it was before the rewrite, if it disagreed.
    pub drifted: Option<PinAllowance>,
}

/// Result of the give-pin transaction.
#[derive(Debug, Clone)]
pub enum GiveOutcome {
    Granted { pin: Pin, allowance: PinAllowance },
    /// Nothing was written; the allowance had no pins left.
    Exhausted,
}
