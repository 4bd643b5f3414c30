//! Score aggregation over feedback responses.
//!
//! Ratings are split by the assessor's role: supervisors carry 60% of an
//! aspect's score and peers 40%. Admin ratings are ignored.
//!
//! Two combination policies exist:
//! [`NullPropagatingWeightedAverage`] feeds per-aspect results, while
//! [`ZeroFillingWeightedAverage`] feeds the team performance dashboard.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::roles::{AssessorClass, RoleDirectory};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

/// Share of a score contributed by supervisor ratings.
pub const SUPERVISOR_WEIGHT: f64 = 0.6;
/// Share of a score contributed by peer ratings.
pub const PEER_WEIGHT: f64 = 0.4;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One indicator rating joined with the assessor who gave it.
#[derive(Debug, Clone, PartialEq)]
pub struct RatedResponse {
    pub assessor_id: DbId,
    pub aspect: String,
    pub indicator: String,
    pub rating: i32,
}

// ---------------------------------------------------------------------------
// Combination policies
// ---------------------------------------------------------------------------

/// How a supervisor average and a peer average become one score.
pub trait WeightedAverage {
    fn combine(&self, supervisor: Option<f64>, peer: Option<f64>) -> Option<f64>;
}

/// Missing sides drop out: with one side present its value is used as-is,
/// with none the result is `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPropagatingWeightedAverage;

impl WeightedAverage for NullPropagatingWeightedAverage {
    fn combine(&self, supervisor: Option<f64>, peer: Option<f64>) -> Option<f64> {
        match (supervisor, peer) {
            (Some(s), Some(p)) => Some(s * SUPERVISOR_WEIGHT + p * PEER_WEIGHT),
            (Some(s), None) => Some(s),
            (None, Some(p)) => Some(p),
            (None, None) => None,
        }
    }
}

/// Missing sides count as zero before weighting. Always yields a value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroFillingWeightedAverage;

impl WeightedAverage for ZeroFillingWeightedAverage {
    fn combine(&self, supervisor: Option<f64>, peer: Option<f64>) -> Option<f64> {
        Some(supervisor.unwrap_or(0.0) * SUPERVISOR_WEIGHT + peer.unwrap_or(0.0) * PEER_WEIGHT)
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Aggregated score for one competency aspect.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AspectResult {
    pub aspect: String,
    pub supervisor_average: Option<f64>,
    pub peer_average: Option<f64>,
    pub final_score: Option<f64>,
    /// Distinct assessors who rated this aspect.
    pub total_feedback: usize,
    pub supervisor_rating_count: usize,
    pub peer_rating_count: usize,
    pub has_supervisor_assessment: bool,
    pub has_peer_assessment: bool,
}

/// Per-aspect results plus overall figures for one assessee.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AspectSummary {
    pub aspect_results: Vec<AspectResult>,
    pub overall_score: f64,
    /// Distinct assessors across all aspects.
    pub total_feedback: usize,
    pub supervisor_feedback_count: usize,
    pub peer_feedback_count: usize,
}

/// Dashboard figures computed across every response regardless of aspect.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TeamPerformance {
    pub supervisor_average: f64,
    pub peer_average: f64,
    pub overall_score: f64,
    pub response_count: usize,
    pub assessor_count: usize,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Default)]
struct AspectBucket {
    supervisor: Vec<i32>,
    peer: Vec<i32>,
    assessors: HashSet<DbId>,
}

/// Group responses by aspect (in first-seen order) and score each group.
pub fn compute_aspect_results<D: RoleDirectory + ?Sized>(
    responses: &[RatedResponse],
    roles: &D,
) -> Vec<AspectResult> {
    let mut buckets: IndexMap<&str, AspectBucket> = IndexMap::new();

    for r in responses {
        let from_supervisor = match roles.classify_assessor(r.assessor_id) {
            AssessorClass::Supervisor => true,
            AssessorClass::Peer => false,
            AssessorClass::Excluded => continue,
        };
        let bucket = buckets.entry(r.aspect.as_str()).or_default();
        if from_supervisor {
            bucket.supervisor.push(r.rating);
        } else {
            bucket.peer.push(r.rating);
        }
        bucket.assessors.insert(r.assessor_id);
    }

    let policy = NullPropagatingWeightedAverage;
    buckets
        .into_iter()
        .map(|(aspect, b)| {
            let supervisor_average = mean(&b.supervisor);
            let peer_average = mean(&b.peer);
            AspectResult {
                aspect: aspect.to_string(),
                supervisor_average,
                peer_average,
                final_score: policy.combine(supervisor_average, peer_average),
                total_feedback: b.assessors.len(),
                supervisor_rating_count: b.supervisor.len(),
                peer_rating_count: b.peer.len(),
                has_supervisor_assessment: !b.supervisor.is_empty(),
                has_peer_assessment: !b.peer.is_empty(),
            }
        })
        .collect()
}

/// Mean of every non-null aspect score, or `0.0` when there are none.
pub fn compute_overall_score(results: &[AspectResult]) -> f64 {
    let scores: Vec<f64> = results.iter().filter_map(|r| r.final_score).collect();
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

/// Full per-aspect summary for one assessee.
pub fn summarize<D: RoleDirectory + ?Sized>(
    responses: &[RatedResponse],
    roles: &D,
) -> AspectSummary {
    let aspect_results = compute_aspect_results(responses, roles);
    let overall_score = compute_overall_score(&aspect_results);

    let mut supervisors = HashSet::new();
    let mut peers = HashSet::new();
    for r in responses {
        match roles.classify_assessor(r.assessor_id) {
            AssessorClass::Supervisor => {
                supervisors.insert(r.assessor_id);
            }
            AssessorClass::Peer => {
                peers.insert(r.assessor_id);
            }
            AssessorClass::Excluded => {}
        }
    }

    AspectSummary {
        aspect_results,
        overall_score,
        total_feedback: supervisors.len() + peers.len(),
        supervisor_feedback_count: supervisors.len(),
        peer_feedback_count: peers.len(),
    }
}

/// 60/40 blend over raw ratings, empty sides counted as zero.
pub fn compute_team_performance<D: RoleDirectory + ?Sized>(
    responses: &[RatedResponse],
    roles: &D,
) -> TeamPerformance {
    let mut supervisor = Vec::new();
    let mut peer = Vec::new();
    let mut assessors = HashSet::new();

    for r in responses {
        match roles.classify_assessor(r.assessor_id) {
            AssessorClass::Supervisor => supervisor.push(r.rating),
            AssessorClass::Peer => peer.push(r.rating),
            AssessorClass::Excluded => continue,
        }
        assessors.insert(r.assessor_id);
    }

    let supervisor_average = mean(&supervisor).unwrap_or(0.0);
    let peer_average = mean(&peer).unwrap_or(0.0);
    let overall_score = ZeroFillingWeightedAverage
        .combine(Some(supervisor_average), Some(peer_average))
        .unwrap_or(0.0);

    TeamPerformance {
        supervisor_average,
        peer_average,
        overall_score,
        response_count: supervisor.len() + peer.len(),
        assessor_count: assessors.len(),
    }
}

fn mean(values: &[i32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
    Some(sum as f64 / values.len() as f64)
}
