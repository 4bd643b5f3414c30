//! Integration tests for the pin give/cancel transactions.
//!
//! Exercises `PinRepo` and `AllowanceRepo` against a real database:
//! - Lazy allowance creation on first give
//! - Exhaustion leaves no partial state
//! - Cancel reverses give and seeds missing rows
//! - Reconciliation against concurrent gives
//! - Grouped receiver counts

use apresiasi_core::allowance::{cancel_seed, AllowanceBalance, DEFAULT_PIN_QUOTA};
use apresiasi_core::calendar::week_number;
use apresiasi_core::types::{DbId, Timestamp};
use apresiasi_db::models::pin::{CreateAllowance, GiveOutcome, NewPin};
use apresiasi_db::models::profile::CreateProfile;
use apresiasi_db::repositories::{AllowanceRepo, PinRepo, ProfileRepo};
use chrono::TimeZone;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn profile(pool: &PgPool, name: &str) -> DbId {
    ProfileRepo::create(
        pool,
        &CreateProfile {
            email: format!("{name}@bps.go.id"),
            full_name: name.to_string(),
            jabatan: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn sept(day: u32) -> Timestamp {
    chrono::Utc.with_ymd_and_hms(2025, 9, day, 9, 0, 0).unwrap()
}

fn new_pin(giver_id: DbId, receiver_id: DbId, given_at: Timestamp) -> NewPin {
    NewPin {
        giver_id,
        receiver_id,
        given_at,
        week_number: week_number(given_at),
        month: 9,
        year: 2025,
    }
}

// ---------------------------------------------------------------------------
// Test: Give
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_first_give_seeds_allowance(pool: PgPool) {
    let giver = profile(&pool, "ani").await;
    let receiver = profile(&pool, "budi").await;

    let outcome = PinRepo::give(&pool, &new_pin(giver, receiver, sept(15)), DEFAULT_PIN_QUOTA)
        .await
        .unwrap();

    let GiveOutcome::Granted { pin, allowance } = outcome else {
        panic!("first give should be granted");
    };
    assert_eq!(pin.giver_id, giver);
    assert_eq!(pin.receiver_id, receiver);
    assert_eq!(pin.week_number, week_number(sept(15)));
    assert_eq!(allowance.pins_remaining, DEFAULT_PIN_QUOTA - 1);
    assert_eq!(allowance.pins_used, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_give_until_exhausted(pool: PgPool) {
    let giver = profile(&pool, "citra").await;
    let receiver = profile(&pool, "dedi").await;
    AllowanceRepo::create(
        &pool,
        &CreateAllowance {
            user_id: giver,
            month: 9,
            year: 2025,
            pins_remaining: 1,
            pins_used: 3,
        },
    )
    .await
    .unwrap();

    let first = PinRepo::give(&pool, &new_pin(giver, receiver, sept(15)), DEFAULT_PIN_QUOTA)
        .await
        .unwrap();
    let GiveOutcome::Granted { allowance, .. } = first else {
        panic!("give with one pin left should be granted");
    };
    assert_eq!(allowance.pins_remaining, 0);
    assert_eq!(allowance.pins_used, 4);

    let second = PinRepo::give(&pool, &new_pin(giver, receiver, sept(15)), DEFAULT_PIN_QUOTA)
        .await
        .unwrap();
    assert!(matches!(second, GiveOutcome::Exhausted));

    // No pin row was written by the rejected give.
    let given = PinRepo::list_given_between(&pool, giver, sept(1), sept(30))
        .await
        .unwrap();
    assert_eq!(given.len(), 1);

    let stored = AllowanceRepo::find(&pool, giver, 9, 2025).await.unwrap().unwrap();
    assert_eq!(stored.pins_remaining, 0);
    assert_eq!(stored.pins_used, 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_gives_never_over_grant(pool: PgPool) {
    let giver = profile(&pool, "eka").await;
    let receiver = profile(&pool, "fajar").await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = pool.clone();
        let pin = new_pin(giver, receiver, sept(10));
        handles.push(tokio::spawn(async move {
            PinRepo::give(&pool, &pin, DEFAULT_PIN_QUOTA).await
        }));
    }

    let mut granted = 0;
    for h in handles {
        if let GiveOutcome::Granted { .. } = h.await.unwrap().unwrap() {
            granted += 1;
        }
    }
    assert_eq!(granted, DEFAULT_PIN_QUOTA);

    let stored = AllowanceRepo::find(&pool, giver, 9, 2025).await.unwrap().unwrap();
    assert_eq!(stored.pins_remaining, 0);
    assert_eq!(stored.pins_used, DEFAULT_PIN_QUOTA);
}

// ---------------------------------------------------------------------------
// Test: Cancel
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cancel_reverses_give(pool: PgPool) {
    let giver = profile(&pool, "gita").await;
    let receiver = profile(&pool, "hadi").await;

    let GiveOutcome::Granted { pin, .. } =
        PinRepo::give(&pool, &new_pin(giver, receiver, sept(3)), DEFAULT_PIN_QUOTA)
            .await
            .unwrap()
    else {
        panic!("give should be granted");
    };

    let allowance = PinRepo::cancel(&pool, pin.id, giver, 9, 2025, cancel_seed(DEFAULT_PIN_QUOTA))
        .await
        .unwrap()
        .expect("own pin should be cancelled");
    assert_eq!(allowance.pins_remaining, DEFAULT_PIN_QUOTA);
    assert_eq!(allowance.pins_used, 0);
    assert!(PinRepo::find_by_id(&pool, pin.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cancel_by_other_user_changes_nothing(pool: PgPool) {
    let giver = profile(&pool, "indah").await;
    let receiver = profile(&pool, "joko").await;

    let GiveOutcome::Granted { pin, .. } =
        PinRepo::give(&pool, &new_pin(giver, receiver, sept(3)), DEFAULT_PIN_QUOTA)
            .await
            .unwrap()
    else {
        panic!("give should be granted");
    };

    let result = PinRepo::cancel(&pool, pin.id, receiver, 9, 2025, cancel_seed(DEFAULT_PIN_QUOTA))
        .await
        .unwrap();
    assert!(result.is_none());
    assert!(PinRepo::find_by_id(&pool, pin.id).await.unwrap().is_some());

    let stored = AllowanceRepo::find(&pool, giver, 9, 2025).await.unwrap().unwrap();
    assert_eq!(stored.pins_used, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cancel_without_allowance_row_seeds_above_quota(pool: PgPool) {
    let giver = profile(&pool, "kartika").await;
    let receiver = profile(&pool, "lukman").await;

    let GiveOutcome::Granted { pin, .. } =
        PinRepo::give(&pool, &new_pin(giver, receiver, sept(3)), DEFAULT_PIN_QUOTA)
            .await
            .unwrap()
    else {
        panic!("give should be granted");
    };

    // Credit a month that has no allowance row.
    let allowance = PinRepo::cancel(&pool, pin.id, giver, 10, 2025, cancel_seed(DEFAULT_PIN_QUOTA))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(allowance.month, 10);
    assert_eq!(allowance.pins_remaining, DEFAULT_PIN_QUOTA + 1);
    assert_eq!(allowance.pins_used, 0);
}

// ---------------------------------------------------------------------------
// Test: Counts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_received_counts_are_grouped_and_windowed(pool: PgPool) {
    let a = profile(&pool, "mira").await;
    let b = profile(&pool, "nanda").await;
    let c = profile(&pool, "oki").await;

    for (giver, receiver, day) in [(a, b, 2), (c, b, 5), (a, c, 7)] {
        PinRepo::give(&pool, &new_pin(giver, receiver, sept(day)), DEFAULT_PIN_QUOTA)
            .await
            .unwrap();
    }

    let mut counts = PinRepo::count_received_between(&pool, sept(1), sept(6))
        .await
        .unwrap();
    counts.sort_by_key(|r| r.receiver_id);
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].receiver_id, b);
    assert_eq!(counts[0].pins_received, 2);

    let given = PinRepo::list_given_between(&pool, a, sept(1), sept(30))
        .await
        .unwrap();
    assert_eq!(given.len(), 2);
    assert_eq!(given[0].receiver_id, c, "newest first");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reconcile_rewrites_drifted_row(pool: PgPool) {
    let giver = profile(&pool, "putri").await;
    let receiver = profile(&pool, "rudi").await;

    // No row yet: the derived balance is reported and nothing is written.
    let fresh = PinRepo::reconcile(&pool, giver, 9, 2025, sept(1), sept(30), DEFAULT_PIN_QUOTA)
        .await
        .unwrap();
    assert_eq!(fresh.balance, AllowanceBalance::seeded(DEFAULT_PIN_QUOTA));
    assert!(fresh.drifted.is_none());
    assert!(AllowanceRepo::find(&pool, giver, 9, 2025).await.unwrap().is_none());

    AllowanceRepo::create(
        &pool,
        &CreateAllowance {
            user_id: giver,
            month: 9,
            year: 2025,
            pins_remaining: 0,
            pins_used: 4,
        },
    )
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO pins (giver_id, receiver_id, given_at, week_number, month, year)
         VALUES ($1, $2, $3, $4, 9, 2025)",
    )
    .bind(giver)
    .bind(receiver)
    .bind(sept(2))
    .bind(week_number(sept(2)))
    .execute(&pool)
    .await
    .unwrap();

    let fixed = PinRepo::reconcile(&pool, giver, 9, 2025, sept(1), sept(30), DEFAULT_PIN_QUOTA)
        .await
        .unwrap();
    assert_eq!(fixed.balance, AllowanceBalance::derived(DEFAULT_PIN_QUOTA, 1));
    let before = fixed.drifted.expect("stored row disagreed with the pins");
    assert_eq!(before.pins_used, 4);

    let stored = AllowanceRepo::find(&pool, giver, 9, 2025).await.unwrap().unwrap();
    assert_eq!(stored.pins_remaining, DEFAULT_PIN_QUOTA - 1);
    assert_eq!(stored.pins_used, 1);

    let again = PinRepo::reconcile(&pool, giver, 9, 2025, sept(1), sept(30), DEFAULT_PIN_QUOTA)
        .await
        .unwrap();
    assert!(again.drifted.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reconcile_during_gives_never_over_grants(pool: PgPool) {
    let receiver = profile(&pool, "sari").await;
    let mut givers = Vec::new();
    for i in 0..10 {
        givers.push(profile(&pool, &format!("giver{i}")).await);
    }

    let mut handles = Vec::new();
    for &giver in &givers {
        let pool_give = pool.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..8 {
                let pin = new_pin(giver, receiver, sept(10));
                PinRepo::give(&pool_give, &pin, DEFAULT_PIN_QUOTA).await.unwrap();
            }
        }));
        for _ in 0..4 {
            let pool_read = pool.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..8 {
                    PinRepo::reconcile(
                        &pool_read,
                        giver,
                        9,
                        2025,
                        sept(1),
                        sept(30),
                        DEFAULT_PIN_QUOTA,
                    )
                    .await
                    .unwrap();
                }
            }));
        }
    }
    for h in handles {
        h.await.unwrap();
    }

    for giver in givers {
        let given = PinRepo::list_given_between(&pool, giver, sept(1), sept(30))
            .await
            .unwrap();
        assert_eq!(given.len(), DEFAULT_PIN_QUOTA as usize, "giver {giver}");

        let stored = AllowanceRepo::find(&pool, giver, 9, 2025).await.unwrap().unwrap();
        assert_eq!(stored.pins_remaining, 0);
        assert_eq!(stored.pins_used, DEFAULT_PIN_QUOTA);
    }
}
