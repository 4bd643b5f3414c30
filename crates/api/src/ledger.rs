//! Pin ledger: give, cancel and allowance reads on top of the repositories.
//!
//! Period resolution and balance arithmetic live in `apresiasi_core`; the
//! atomic row mutations live in [`PinRepo`]. Functions here take `now`
//! explicitly so callers (and tests) control the clock.

use std::collections::HashMap;

use apresiasi_core::allowance::cancel_seed;
use apresiasi_core::calendar::week_number;
use apresiasi_core::error::CoreError;
use apresiasi_core::period::{
    ensure_within_period, month_of, resolve_active_window, resolve_window_for_month, PeriodKind,
    PeriodWindow,
};
use apresiasi_core::ranking::{rank_receivers, RankingEntry, ReceivedCount};
use apresiasi_core::roles::RoleDirectory;
use apresiasi_core::types::{Date, DbId, Timestamp};
use apresiasi_db::models::pin::{GiveOutcome, NewPin, Pin};
use apresiasi_db::repositories::{PeriodRepo, PinRepo, ProfileRepo};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Result of a successful give.
#[derive(Debug, Serialize)]
pub struct GivenPin {
    pub pin: Pin,
    pub pins_remaining: i32,
    pub pins_used: i32,
}

/// Result of a successful cancel.
#[derive(Debug, Serialize)]
pub struct CancelledPin {
    pub pin_id: DbId,
    pub month: i32,
    pub year: i32,
    pub pins_remaining: i32,
    pub pins_used: i32,
}

/// A user's allowance for the current pin window.
#[derive(Debug, Serialize)]
pub struct AllowanceView {
    pub month: i32,
    pub year: i32,
    pub pins_remaining: i32,
    pub pins_used: i32,
    pub quota: i32,
    pub period_id: Option<DbId>,
    pub start_date: Date,
    /// Inclusive.
    pub end_date: Date,
}

/// One ranking row with the receiver's display fields.
#[derive(Debug, Serialize)]
pub struct RankedReceiver {
    #[serde(flatten)]
    pub entry: RankingEntry,
    pub full_name: String,
    pub jabatan: Option<String>,
}

/// Ranking for one pin window.
#[derive(Debug, Serialize)]
pub struct MonthlyRanking {
    pub month: i32,
    pub year: i32,
    pub start_date: Date,
    pub end_date: Date,
    pub entries: Vec<RankedReceiver>,
}

// ---------------------------------------------------------------------------
// Window resolution
// ---------------------------------------------------------------------------

/// The active pin window, falling back to the calendar month of `now`.
pub async fn active_pin_window(pool: &PgPool, now: Timestamp) -> AppResult<PeriodWindow> {
    let active = PeriodRepo::find_active(pool, PeriodKind::Pin).await?;
    let span = active.as_ref().map(|p| p.span());
    Ok(resolve_active_window(PeriodKind::Pin, span.as_ref(), now)?)
}

/// The pin window for an explicit month, preferring a configured period.
pub async fn pin_window_for_month(pool: &PgPool, month: i32, year: i32) -> AppResult<PeriodWindow> {
    let configured = PeriodRepo::find_for_month(pool, PeriodKind::Pin, month, year).await?;
    let span = configured.as_ref().map(|p| p.span());
    Ok(resolve_window_for_month(span.as_ref(), month, year)?)
}

/// `(month, year)` whose allowance a cancelled pin is credited back to.
///
/// A configured period covering the pin's date wins (pin periods first),
/// provided it carries a month and year; otherwise the UTC month of
/// `given_at`.
async fn credit_month(pool: &PgPool, given_at: Timestamp) -> AppResult<(i32, i32)> {
    let date = given_at.date_naive();
    for kind in [PeriodKind::Pin, PeriodKind::Assessment] {
        if let Some(period) = PeriodRepo::find_covering_date(pool, kind, date).await? {
            if let (Some(month), Some(year)) = (period.month, period.year) {
                return Ok((month, year));
            }
        }
    }
    Ok(month_of(given_at))
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Give one pin from `giver_id` to `receiver_id` at `now`.
///
/// Requires an active pin period whose dates cover `now`. Self-pins and
/// role checks are the caller's concern.
pub async fn give_pin(
    pool: &PgPool,
    quota: i32,
    giver_id: DbId,
    receiver_id: DbId,
    now: Timestamp,
) -> AppResult<GivenPin> {
    let period = PeriodRepo::find_active(pool, PeriodKind::Pin)
        .await?
        .ok_or(CoreError::NoActivePeriod {
            kind: PeriodKind::Pin,
        })?;
    let span = period.span();
    ensure_within_period(&span, now)?;
    let window = PeriodWindow::from_span(&span, now.date_naive());

    let new_pin = NewPin {
        giver_id,
        receiver_id,
        given_at: now,
        week_number: week_number(now),
        month: window.month,
        year: window.year,
    };

    match PinRepo::give(pool, &new_pin, quota).await? {
        GiveOutcome::Granted { pin, allowance } => {
            tracing::info!(
                pin_id = pin.id,
                giver_id,
                receiver_id,
                month = window.month,
                year = window.year,
                pins_remaining = allowance.pins_remaining,
                "Pin given"
            );
            Ok(GivenPin {
                pin,
                pins_remaining: allowance.pins_remaining,
                pins_used: allowance.pins_used,
            })
        }
        GiveOutcome::Exhausted => {
            tracing::info!(
                giver_id,
                month = window.month,
                year = window.year,
                "Pin allowance exhausted"
            );
            Err(CoreError::AllowanceExhausted.into())
        }
    }
}

/// Cancel a pin on behalf of `requester_id`, who must be its giver.
pub async fn cancel_pin(
    pool: &PgPool,
    quota: i32,
    pin_id: DbId,
    requester_id: DbId,
) -> AppResult<CancelledPin> {
    let pin = PinRepo::find_by_id(pool, pin_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Pin",
            id: pin_id,
        })?;
    if pin.giver_id != requester_id {
        return Err(CoreError::Forbidden("Only the giver may cancel a pin".into()).into());
    }

    let (month, year) = credit_month(pool, pin.given_at).await?;
    let allowance = PinRepo::cancel(pool, pin_id, requester_id, month, year, cancel_seed(quota))
        .await?
        // Deleted by a concurrent cancel between the read and the transaction.
        .ok_or(CoreError::NotFound {
            entity: "Pin",
            id: pin_id,
        })?;

    tracing::info!(
        pin_id,
        giver_id = requester_id,
        month,
        year,
        pins_remaining = allowance.pins_remaining,
        "Pin cancelled"
    );

    Ok(CancelledPin {
        pin_id,
        month,
        year,
        pins_remaining: allowance.pins_remaining,
        pins_used: allowance.pins_used,
    })
}

/// Allowance for the current pin window, derived from pins actually given.
///
/// A stored allowance row that disagrees with the derived balance is
/// rewritten to match, under the same row lock gives take.
pub async fn get_allowance(
    pool: &PgPool,
    quota: i32,
    user_id: DbId,
    now: Timestamp,
) -> AppResult<AllowanceView> {
    let window = active_pin_window(pool, now).await?;
    let reconciled = PinRepo::reconcile(
        pool,
        user_id,
        window.month,
        window.year,
        window.start_at(),
        window.end_at(),
        quota,
    )
    .await?;
    let derived = reconciled.balance;

    if let Some(stored) = &reconciled.drifted {
        tracing::warn!(
            user_id,
            month = window.month,
            year = window.year,
            stored_remaining = stored.pins_remaining,
            stored_used = stored.pins_used,
            derived_remaining = derived.pins_remaining,
            derived_used = derived.pins_used,
            "Allowance drift reconciled"
        );
    }

    Ok(AllowanceView {
        month: window.month,
        year: window.year,
        pins_remaining: derived.pins_remaining,
        pins_used: derived.pins_used,
        quota,
        period_id: window.period_id,
        start_date: window.start,
        end_date: window.last_day(),
    })
}

/// Pins `user_id` gave in the current pin window, newest first.
pub async fn list_given(pool: &PgPool, user_id: DbId, now: Timestamp) -> AppResult<Vec<Pin>> {
    let window = active_pin_window(pool, now).await?;
    Ok(PinRepo::list_given_between(pool, user_id, window.start_at(), window.end_at()).await?)
}

/// Pins received per non-admin user, ranked, for a month or the current window.
///
/// `month` and `year` must be given together.
pub async fn ranking<D: RoleDirectory + ?Sized>(
    pool: &PgPool,
    roles: &D,
    month: Option<i32>,
    year: Option<i32>,
    now: Timestamp,
) -> AppResult<MonthlyRanking> {
    let window = match (month, year) {
        (Some(m), Some(y)) => pin_window_for_month(pool, m, y).await?,
        (None, None) => active_pin_window(pool, now).await?,
        _ => {
            return Err(AppError::BadRequest(
                "month and year must be provided together".into(),
            ))
        }
    };

    let counts: Vec<ReceivedCount> =
        PinRepo::count_received_between(pool, window.start_at(), window.end_at())
            .await?
            .into_iter()
            .map(ReceivedCount::from)
            .collect();
    let ranked = rank_receivers(&counts, roles);

    let profiles: HashMap<DbId, _> = ProfileRepo::list(pool)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    let entries = ranked
        .into_iter()
        .filter_map(|entry| {
            let profile = profiles.get(&entry.receiver_id)?;
            Some(RankedReceiver {
                full_name: profile.full_name.clone(),
                jabatan: profile.jabatan.clone(),
                entry,
            })
        })
        .collect();

    Ok(MonthlyRanking {
        month: window.month,
        year: window.year,
        start_date: window.start,
        end_date: window.last_day(),
        entries,
    })
}
