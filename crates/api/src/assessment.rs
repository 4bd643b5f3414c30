//! 360° assessment: submission, per-assessee results, team dashboard and
//! assessor to-do lists.

use std::collections::HashMap;

use apresiasi_core::assessment::{
    authorize_direct_assessment, validate_responses, SubmissionTarget,
};
use apresiasi_core::error::CoreError;
use apresiasi_core::period::PeriodKind;
use apresiasi_core::roles::RoleDirectory;
use apresiasi_core::scoring::{
    compute_team_performance, summarize, AspectSummary, RatedResponse, TeamPerformance,
};
use apresiasi_core::types::{DbId, Timestamp};
use apresiasi_db::models::assignment::{AssigneeStatus, Assignment, CreateAssignment};
use apresiasi_db::models::feedback::SubmitAssessmentRequest;
use apresiasi_db::models::period::Period;
use apresiasi_db::repositories::{AssignmentRepo, FeedbackResponseRepo, PeriodRepo, ProfileRepo};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::AppResult;

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Outcome of a submission.
#[derive(Debug, Serialize)]
pub struct SubmissionReceipt {
    pub success: bool,
    pub assignment: Assignment,
    pub response_count: usize,
}

/// Aspect scores for one assessee plus who has and has not submitted.
#[derive(Debug, Serialize)]
pub struct AssesseeResults {
    pub assessee_id: DbId,
    pub period_id: Option<DbId>,
    #[serde(flatten)]
    pub summary: AspectSummary,
    pub completed_assessor_ids: Vec<DbId>,
    pub pending_assessor_ids: Vec<DbId>,
}

/// One profile's row on the team dashboard.
#[derive(Debug, Serialize)]
pub struct MemberPerformance {
    pub profile_id: DbId,
    pub full_name: String,
    pub jabatan: Option<String>,
    #[serde(flatten)]
    pub performance: TeamPerformance,
}

/// The caller's assessees for the active assessment period.
#[derive(Debug, Serialize)]
pub struct MyAssignments {
    pub period: Period,
    pub assignments: Vec<AssigneeStatus>,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

async fn require_active_period(pool: &PgPool) -> AppResult<Period> {
    Ok(PeriodRepo::find_active(pool, PeriodKind::Assessment)
        .await?
        .ok_or(CoreError::NoActivePeriod {
            kind: PeriodKind::Assessment,
        })?)
}

/// Store a full set of responses from `assessor_id`, replacing earlier ones.
///
/// The payload is validated before anything is written. A regular assignment
/// must belong to the caller and to the active period; a direct assessment
/// (supervisors only) creates the assignment on first submission.
pub async fn submit_assessment<D: RoleDirectory + ?Sized>(
    pool: &PgPool,
    roles: &D,
    assessor_id: DbId,
    request: SubmitAssessmentRequest,
    now: Timestamp,
) -> AppResult<SubmissionReceipt> {
    let target = SubmissionTarget::from_ids(request.assignment_id, request.assessee_id)?;
    let responses = validate_responses(request.responses)?;

    let assignment = match target {
        SubmissionTarget::Assignment(id) => {
            let assignment = AssignmentRepo::find_by_id(pool, id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Assignment",
                    id,
                })?;
            if assignment.assessor_id != assessor_id {
                return Err(CoreError::Forbidden(
                    "This assignment belongs to another assessor".into(),
                )
                .into());
            }
            let period = require_active_period(pool).await?;
            if assignment.period_id != period.id {
                return Err(CoreError::Conflict(
                    "This assignment is not part of the active assessment period".into(),
                )
                .into());
            }
            assignment
        }
        SubmissionTarget::Assessee(assessee_id) => {
            authorize_direct_assessment(assessor_id, assessee_id, roles)?;
            ProfileRepo::find_by_id(pool, assessee_id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Profile",
                    id: assessee_id,
                })?;
            let period = require_active_period(pool).await?;
            AssignmentRepo::find_or_create(
                pool,
                &CreateAssignment {
                    assessor_id,
                    assessee_id,
                    period_id: period.id,
                },
            )
            .await?
        }
    };

    let updated =
        FeedbackResponseRepo::replace_for_assignment(pool, assignment.id, &responses, now)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Assignment",
                id: assignment.id,
            })?;

    tracing::info!(
        assignment_id = updated.id,
        assessor_id,
        assessee_id = updated.assessee_id,
        period_id = updated.period_id,
        response_count = responses.len(),
        "Assessment submitted"
    );

    Ok(SubmissionReceipt {
        success: true,
        assignment: updated,
        response_count: responses.len(),
    })
}

/// `period_id`, else the active assessment period. `None` means all periods.
async fn reporting_period(pool: &PgPool, period_id: Option<DbId>) -> AppResult<Option<DbId>> {
    match period_id {
        Some(id) => Ok(Some(id)),
        None => Ok(PeriodRepo::find_active(pool, PeriodKind::Assessment)
            .await?
            .map(|p| p.id)),
    }
}

/// Aspect scores for `assessee_id`, with who has and has not submitted.
///
/// Scoped to `period_id`, else the active assessment period, else all
/// periods (participation is then empty).
pub async fn aspect_results<D: RoleDirectory + ?Sized>(
    pool: &PgPool,
    roles: &D,
    assessee_id: DbId,
    period_id: Option<DbId>,
) -> AppResult<AssesseeResults> {
    let period_id = reporting_period(pool, period_id).await?;
    let rated: Vec<RatedResponse> =
        FeedbackResponseRepo::list_rated_for_assessee(pool, assessee_id, period_id)
            .await?
            .into_iter()
            .map(RatedResponse::from)
            .collect();
    let summary = summarize(&rated, roles);

    let mut completed_assessor_ids = Vec::new();
    let mut pending_assessor_ids = Vec::new();
    if let Some(pid) = period_id {
        for a in AssignmentRepo::list_for_assessee(pool, assessee_id, pid).await? {
            if a.is_completed {
                completed_assessor_ids.push(a.assessor_id);
            } else {
                pending_assessor_ids.push(a.assessor_id);
            }
        }
    }

    Ok(AssesseeResults {
        assessee_id,
        period_id,
        summary,
        completed_assessor_ids,
        pending_assessor_ids,
    })
}

/// Raw-rating performance for every non-admin profile, best first.
///
/// Uses `period_id`, else the active assessment period, else all periods.
pub async fn team_performance<D: RoleDirectory + ?Sized>(
    pool: &PgPool,
    roles: &D,
    period_id: Option<DbId>,
) -> AppResult<Vec<MemberPerformance>> {
    let period_id = reporting_period(pool, period_id).await?;

    let mut by_assessee: HashMap<DbId, Vec<RatedResponse>> = HashMap::new();
    for row in FeedbackResponseRepo::list_rated_in_period(pool, period_id).await? {
        by_assessee
            .entry(row.assessee_id)
            .or_default()
            .push(RatedResponse::from(row.rated));
    }

    let mut members: Vec<MemberPerformance> = ProfileRepo::list(pool)
        .await?
        .into_iter()
        .filter(|p| !roles.is_admin(p.id))
        .map(|p| {
            let responses = by_assessee.remove(&p.id).unwrap_or_default();
            MemberPerformance {
                profile_id: p.id,
                full_name: p.full_name,
                jabatan: p.jabatan,
                performance: compute_team_performance(&responses, roles),
            }
        })
        .collect();

    members.sort_by(|a, b| {
        b.performance
            .overall_score
            .total_cmp(&a.performance.overall_score)
            .then_with(|| a.full_name.cmp(&b.full_name))
    });
    Ok(members)
}

/// The caller's assessees in the active assessment period.
///
/// Supervisors implicitly assess every non-admin profile but themselves;
/// everyone else sees only the assignments generated for them.
pub async fn list_my_assignments<D: RoleDirectory + ?Sized>(
    pool: &PgPool,
    roles: &D,
    user_id: DbId,
) -> AppResult<MyAssignments> {
    let period = require_active_period(pool).await?;

    let assignments = if roles.is_supervisor(user_id) {
        let admins: Vec<DbId> = roles
            .all_ids()
            .into_iter()
            .filter(|id| roles.is_admin(*id))
            .collect();
        AssignmentRepo::list_statuses_for_supervisor(pool, user_id, period.id, &admins).await?
    } else {
        AssignmentRepo::list_statuses_for_assessor(pool, user_id, period.id).await?
    };

    Ok(MyAssignments {
        period,
        assignments,
    })
}
