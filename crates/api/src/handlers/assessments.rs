//! Handlers for 360° assessments.

use apresiasi_core::error::CoreError;
use apresiasi_core::roles::RoleDirectory;
use apresiasi_core::types::DbId;
use apresiasi_db::models::feedback::SubmitAssessmentRequest;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::assessment;
use crate::error::AppResult;
use crate::extract::{AppJson, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireSupervisor;
use crate::response::DataResponse;
use crate::roles::load_roles;
use crate::state::AppState;

/// Optional period filter shared by the results endpoints.
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period_id: Option<DbId>,
}

/// GET /api/v1/assessments/assignments
pub async fn list_my_assignments(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let roles = load_roles(&state.pool, &state.config.role_overrides).await?;
    let mine = assessment::list_my_assignments(&state.pool, &roles, auth.profile_id).await?;
    Ok(Json(DataResponse { data: mine }))
}

/// POST /api/v1/assessments/submit
///
/// Replace the caller's responses for one assignment (or, for supervisors,
/// one assessee) and mark it completed.
pub async fn submit(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<SubmitAssessmentRequest>,
) -> AppResult<impl IntoResponse> {
    let roles = load_roles(&state.pool, &state.config.role_overrides).await?;
    let receipt =
        assessment::submit_assessment(&state.pool, &roles, auth.profile_id, input, Utc::now())
            .await?;
    Ok(Json(DataResponse { data: receipt }))
}

/// GET /api/v1/assessments/results/{assessee_id}?period_id=
///
/// Visible to the assessee themselves, supervisors and admins.
pub async fn results(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(assessee_id): Path<DbId>,
    AppQuery(params): AppQuery<PeriodQuery>,
) -> AppResult<impl IntoResponse> {
    let roles = load_roles(&state.pool, &state.config.role_overrides).await?;
    if auth.profile_id != assessee_id
        && !roles.is_supervisor(auth.profile_id)
        && !roles.is_admin(auth.profile_id)
    {
        return Err(CoreError::Forbidden("You may only view your own results".into()).into());
    }

    let results =
        assessment::aspect_results(&state.pool, &roles, assessee_id, params.period_id).await?;
    Ok(Json(DataResponse { data: results }))
}

/// GET /api/v1/assessments/team-performance?period_id=
pub async fn team_performance(
    RequireSupervisor(_user): RequireSupervisor,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<PeriodQuery>,
) -> AppResult<impl IntoResponse> {
    let roles = load_roles(&state.pool, &state.config.role_overrides).await?;
    let team = assessment::team_performance(&state.pool, &roles, params.period_id).await?;
    Ok(Json(DataResponse { data: team }))
}
