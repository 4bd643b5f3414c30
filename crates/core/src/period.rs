//! Period kinds and date-window resolution.
//!
//! A window is the half-open interval `[start, end_exclusive)`. Configured
//! periods store an inclusive `end_date`, so their window ends the day after.

use chrono::{Datelike, Days, NaiveDate, NaiveTime};

use crate::error::CoreError;
use crate::types::{Date, DbId, Timestamp};

// ---------------------------------------------------------------------------
// Period kinds
// ---------------------------------------------------------------------------

/// The two structurally identical period tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    Assessment,
    Pin,
}

impl PeriodKind {
    /// Parse the path segment used by the admin routes.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw {
            "assessment" => Ok(Self::Assessment),
            "pin" => Ok(Self::Pin),
            other => Err(CoreError::Validation(format!(
                "Unknown period kind '{other}'. Must be one of: assessment, pin"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assessment => "assessment",
            Self::Pin => "pin",
        }
    }

    /// Whether a missing active period falls back to the calendar month.
    ///
    /// Pin allowances do; assessments must be tied to a configured period.
    pub fn falls_back_to_calendar_month(self) -> bool {
        matches!(self, Self::Pin)
    }
}

impl std::fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Configured periods
// ---------------------------------------------------------------------------

/// The date-relevant fields of a configured period row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSpan {
    pub id: DbId,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub start_date: Date,
    pub end_date: Date,
}

impl PeriodSpan {
    /// Inclusive date-only membership test against `[start_date, end_date]`.
    pub fn covers(&self, date: Date) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Validate the fields of a period before it is stored.
pub fn validate_period_input(
    month: Option<i32>,
    year: Option<i32>,
    start_date: Date,
    end_date: Date,
) -> Result<(), CoreError> {
    if start_date > end_date {
        return Err(CoreError::Validation(format!(
            "start_date ({start_date}) must not be after end_date ({end_date})"
        )));
    }
    if let Some(m) = month {
        validate_month(m)?;
    }
    if let Some(y) = year {
        if !(2000..=9999).contains(&y) {
            return Err(CoreError::Validation(format!(
                "year must be between 2000 and 9999, got {y}"
            )));
        }
    }
    Ok(())
}

pub fn validate_month(month: i32) -> Result<(), CoreError> {
    if !(1..=12).contains(&month) {
        return Err(CoreError::Validation(format!(
            "month must be between 1 and 12, got {month}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

/// An authoritative date window for ledger and aggregation queries.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PeriodWindow {
    /// The configured period this window came from, if any.
    pub period_id: Option<DbId>,
    pub start: Date,
    pub end_exclusive: Date,
    /// Month used to key allowance rows.
    pub month: i32,
    pub year: i32,
}

impl PeriodWindow {
    /// Window of a configured period. Missing month/year fall back to `today`'s.
    pub fn from_span(span: &PeriodSpan, today: Date) -> Self {
        Self {
            period_id: Some(span.id),
            start: span.start_date,
            end_exclusive: day_after(span.end_date),
            month: span.month.unwrap_or(today.month() as i32),
            year: span.year.unwrap_or(today.year()),
        }
    }

    /// The full calendar month `[year-month-01, first of next month)`.
    pub fn calendar_month(year: i32, month: i32) -> Result<Self, CoreError> {
        validate_month(month)?;
        let start = first_of_month(year, month)?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let end_exclusive = first_of_month(next_year, next_month)?;
        Ok(Self {
            period_id: None,
            start,
            end_exclusive,
            month,
            year,
        })
    }

    /// Inclusive last day of the window.
    pub fn last_day(&self) -> Date {
        self.end_exclusive.pred_opt().unwrap_or(self.end_exclusive)
    }

    /// `start` at midnight UTC, for timestamp range filters.
    pub fn start_at(&self) -> Timestamp {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    /// `end_exclusive` at midnight UTC, for timestamp range filters.
    pub fn end_at(&self) -> Timestamp {
        self.end_exclusive.and_time(NaiveTime::MIN).and_utc()
    }
}

/// Resolve the window for a kind given its active period (if one exists).
///
/// Pin windows fall back to the calendar month containing `now`; assessment
/// windows fail with [`CoreError::NoActivePeriod`].
pub fn resolve_active_window(
    kind: PeriodKind,
    active: Option<&PeriodSpan>,
    now: Timestamp,
) -> Result<PeriodWindow, CoreError> {
    let today = now.date_naive();
    match active {
        Some(span) => Ok(PeriodWindow::from_span(span, today)),
        None if kind.falls_back_to_calendar_month() => {
            PeriodWindow::calendar_month(today.year(), today.month() as i32)
        }
        None => Err(CoreError::NoActivePeriod { kind }),
    }
}

/// Resolve the window for an explicit month, preferring a configured period.
pub fn resolve_window_for_month(
    configured: Option<&PeriodSpan>,
    month: i32,
    year: i32,
) -> Result<PeriodWindow, CoreError> {
    validate_month(month)?;
    match configured {
        Some(span) => Ok(PeriodWindow {
            period_id: Some(span.id),
            start: span.start_date,
            end_exclusive: day_after(span.end_date),
            month,
            year,
        }),
        None => PeriodWindow::calendar_month(year, month),
    }
}

/// Ensure `now` falls on a day inside the active period (date-only comparison).
pub fn ensure_within_period(span: &PeriodSpan, now: Timestamp) -> Result<(), CoreError> {
    let date = now.date_naive();
    if span.covers(date) {
        Ok(())
    } else {
        Err(CoreError::OutOfPeriodRange {
            date,
            start: span.start_date,
            end: span.end_date,
        })
    }
}

/// The `(month, year)` a timestamp belongs to in UTC.
pub fn month_of(ts: Timestamp) -> (i32, i32) {
    (ts.month() as i32, ts.year())
}

fn day_after(date: Date) -> Date {
    date.checked_add_days(Days::new(1)).unwrap_or(date)
}

fn first_of_month(year: i32, month: i32) -> Result<Date, CoreError> {
    NaiveDate::from_ymd_opt(year, month as u32, 1)
        .ok_or_else(|| CoreError::Validation(format!("Invalid month {year}-{month:02}")))
}
