//! Admin handlers for assessment and pin periods.
//!
//! `{kind}` in every path is `assessment` or `pin`.

use apresiasi_core::error::CoreError;
use apresiasi_core::period::{validate_period_input, PeriodKind};
use apresiasi_core::types::DbId;
use apresiasi_db::models::period::CreatePeriod;
use apresiasi_db::repositories::PeriodRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/periods/{kind}
pub async fn list_periods(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> AppResult<impl IntoResponse> {
    let kind = PeriodKind::parse(&kind)?;
    let periods = PeriodRepo::list(&state.pool, kind).await?;
    Ok(Json(DataResponse { data: periods }))
}

/// POST /api/v1/admin/periods/{kind}
///
/// New periods start inactive; activate them separately.
pub async fn create_period(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(kind): Path<String>,
    AppJson(input): AppJson<CreatePeriod>,
) -> AppResult<impl IntoResponse> {
    let kind = PeriodKind::parse(&kind)?;
    validate_period_input(input.month, input.year, input.start_date, input.end_date)?;

    let period = PeriodRepo::create(&state.pool, kind, &input).await?;

    tracing::info!(
        period_id = period.id,
        kind = %kind,
        start_date = %period.start_date,
        end_date = %period.end_date,
        admin_id = admin.profile_id,
        "Period created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: period })))
}

/// POST /api/v1/admin/periods/{kind}/{id}/activate
///
/// Deactivates every other period of the same kind.
pub async fn activate_period(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, DbId)>,
) -> AppResult<impl IntoResponse> {
    let kind = PeriodKind::parse(&kind)?;
    let period = PeriodRepo::activate(&state.pool, kind, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Period",
            id,
        })?;

    tracing::info!(
        period_id = id,
        kind = %kind,
        admin_id = admin.profile_id,
        "Period activated"
    );

    Ok(Json(DataResponse { data: period }))
}

/// POST /api/v1/admin/periods/{kind}/{id}/complete
pub async fn complete_period(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, DbId)>,
) -> AppResult<impl IntoResponse> {
    let kind = PeriodKind::parse(&kind)?;
    let period = PeriodRepo::complete(&state.pool, kind, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Period",
            id,
        })?;

    tracing::info!(
        period_id = id,
        kind = %kind,
        admin_id = admin.profile_id,
        "Period completed"
    );

    Ok(Json(DataResponse { data: period }))
}
