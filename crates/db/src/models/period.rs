//! Period entity model and DTOs.
//!
//! `assessment_periods` and `pin_periods` share this shape; the repository
//! picks the table from a [`PeriodKind`](apresiasi_core::period::PeriodKind).

use apresiasi_core::period::PeriodSpan;
use apresiasi_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from `assessment_periods` or `pin_periods`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Period {
    pub id: DbId,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub start_date: Date,
    /// Inclusive.
    pub end_date: Date,
    pub is_active: bool,
    pub is_completed: bool,
    pub created_at: Timestamp,
}

impl Period {
    /// The date-relevant fields used by window resolution.
    pub fn span(&self) -> PeriodSpan {
        PeriodSpan {
            id: self.id,
            month: self.month,
            year: self.year,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// DTO for creating a period. New periods start inactive.
#[derive(Debug, Deserialize)]
pub struct CreatePeriod {
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub start_date: Date,
    pub end_date: Date,
}
