//! Week numbering for pins.
//!
//! Week 1 is the week containing January 1st. The value is
//! `ceil((day_of_year + adjusted_start_day - 2) / 7)`, where
//! `adjusted_start_day` is the weekday of January 1st with Sunday counted as 7.
//! This is not ISO-8601 and must not be swapped for `iso_week()`.

use chrono::{Datelike, NaiveDate};

use crate::types::Timestamp;

/// Week number of a UTC timestamp.
pub fn week_number(ts: Timestamp) -> i32 {
    week_number_of_date(ts.date_naive())
}

/// Week number of a calendar date.
pub fn week_number_of_date(date: NaiveDate) -> i32 {
    let day_of_year = date.ordinal() as i32;
    let jan_first = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
    let adjusted_start_day = match jan_first.weekday().num_days_from_sunday() {
        0 => 7,
        d => d as i32,
    };
    let numerator = day_of_year + adjusted_start_day - 2;
    // numerator >= 0, so this is ceil division.
    (numerator + 6) / 7
}
