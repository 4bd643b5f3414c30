//! Pin allowance arithmetic.
//!
//! The stored counters are a cache of the pin rows; see [`AllowanceBalance::derived`]
//! for the authoritative read path.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Quota
// ---------------------------------------------------------------------------

/// Pins each user may give per period unless configured otherwise.
pub const DEFAULT_PIN_QUOTA: i32 = 4;

/// Upper bound accepted for a configured quota.
pub const MAX_PIN_QUOTA: i32 = 100;

/// Seed for an allowance row first created by a cancellation.
///
/// The cancelled pin is credited on top of a fresh quota.
pub fn cancel_seed(quota: i32) -> i32 {
    quota + 1
}

/// Validate a configured quota.
pub fn validate_quota(quota: i32) -> Result<(), CoreError> {
    if !(1..=MAX_PIN_QUOTA).contains(&quota) {
        return Err(CoreError::Validation(format!(
            "Pin quota must be between 1 and {MAX_PIN_QUOTA}, got {quota}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Balance
// ---------------------------------------------------------------------------

/// Remaining/used counters for one user in one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct AllowanceBalance {
    pub pins_remaining: i32,
    pub pins_used: i32,
}

impl AllowanceBalance {
    /// A fresh row: full quota, nothing used.
    pub fn seeded(quota: i32) -> Self {
        Self {
            pins_remaining: quota,
            pins_used: 0,
        }
    }

    /// Balance computed from the number of pins actually given in the window.
    pub fn derived(quota: i32, pins_given: i64) -> Self {
        let used = i32::try_from(pins_given).unwrap_or(i32::MAX);
        Self {
            pins_remaining: (quota - used).max(0),
            pins_used: used,
        }
    }

    /// Move one unit from remaining to used.
    pub fn give(self) -> Result<Self, CoreError> {
        if self.pins_remaining <= 0 {
            return Err(CoreError::AllowanceExhausted);
        }
        Ok(Self {
            pins_remaining: self.pins_remaining - 1,
            pins_used: self.pins_used + 1,
        })
    }

    /// Move one unit back from used to remaining, never going negative.
    pub fn cancel(self) -> Self {
        Self {
            pins_remaining: (self.pins_remaining + 1).max(0),
            pins_used: (self.pins_used - 1).max(0),
        }
    }
}
