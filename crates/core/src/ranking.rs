//! Monthly pin recognition ranking.

use crate::roles::RoleDirectory;
use crate::types::DbId;

/// Pins received by one user in a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceivedCount {
    pub receiver_id: DbId,
    pub pins_received: i64,
}

/// One row of the ranking.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RankingEntry {
    pub rank: u32,
    pub receiver_id: DbId,
    pub pins_received: i64,
}

/// Rank receivers by pins received, most first, ties broken by id.
///
/// Uses competition ranking (1, 2, 2, 4). Admins and zero counts are dropped.
pub fn rank_receivers<D: RoleDirectory + ?Sized>(
    counts: &[ReceivedCount],
    roles: &D,
) -> Vec<RankingEntry> {
    let mut eligible: Vec<ReceivedCount> = counts
        .iter()
        .copied()
        .filter(|c| c.pins_received > 0 && !roles.is_admin(c.receiver_id))
        .collect();
    eligible.sort_by(|a, b| {
        b.pins_received
            .cmp(&a.pins_received)
            .then(a.receiver_id.cmp(&b.receiver_id))
    });

    let mut entries = Vec::with_capacity(eligible.len());
    let mut rank = 0;
    let mut previous: Option<i64> = None;
    for (position, c) in eligible.into_iter().enumerate() {
        if previous != Some(c.pins_received) {
            rank = position as u32 + 1;
            previous = Some(c.pins_received);
        }
        entries.push(RankingEntry {
            rank,
            receiver_id: c.receiver_id,
            pins_received: c.pins_received,
        });
    }
    entries
}
