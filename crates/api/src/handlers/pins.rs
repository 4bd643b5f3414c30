//! Handlers for pin recognition: allowance, give, cancel, history, ranking.

use apresiasi_core::error::CoreError;
use apresiasi_core::roles::RoleDirectory;
use apresiasi_core::types::DbId;
use apresiasi_db::models::pin::GivePinRequest;
use apresiasi_db::repositories::ProfileRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppQuery};
use crate::ledger;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::roles::load_roles;
use crate::state::AppState;

/// Query parameters for `GET /pins/ranking`.
#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    pub month: Option<i32>,
    pub year: Option<i32>,
}

/// GET /api/v1/pins/allowance
///
/// The caller's remaining and used pins for the current pin window.
pub async fn get_allowance(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let allowance = ledger::get_allowance(
        &state.pool,
        state.config.pin_quota,
        auth.profile_id,
        Utc::now(),
    )
    .await?;
    Ok(Json(DataResponse { data: allowance }))
}

/// POST /api/v1/pins
///
/// Give one pin to `receiver_id`. Admins neither give nor receive pins, and
/// nobody can pin themselves.
pub async fn give_pin(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<GivePinRequest>,
) -> AppResult<impl IntoResponse> {
    if input.receiver_id == auth.profile_id {
        return Err(AppError::BadRequest("You cannot give a pin to yourself".into()));
    }

    let roles = load_roles(&state.pool, &state.config.role_overrides).await?;
    if roles.is_admin(auth.profile_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Admins do not take part in pin recognition".into(),
        )));
    }
    if roles.is_admin(input.receiver_id) {
        return Err(AppError::BadRequest("Admins cannot receive pins".into()));
    }
    ProfileRepo::find_by_id(&state.pool, input.receiver_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Profile",
            id: input.receiver_id,
        })?;

    let given = ledger::give_pin(
        &state.pool,
        state.config.pin_quota,
        auth.profile_id,
        input.receiver_id,
        Utc::now(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: given })))
}

/// DELETE /api/v1/pins/{id}
///
/// Cancel a pin the caller gave and credit it back to their allowance.
pub async fn cancel_pin(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let cancelled =
        ledger::cancel_pin(&state.pool, state.config.pin_quota, id, auth.profile_id).await?;
    Ok(Json(DataResponse { data: cancelled }))
}

/// GET /api/v1/pins/given
pub async fn list_given(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let pins = ledger::list_given(&state.pool, auth.profile_id, Utc::now()).await?;
    Ok(Json(DataResponse { data: pins }))
}

/// GET /api/v1/pins/ranking?month=&year=
///
/// Without parameters the current pin window is ranked.
pub async fn ranking(
    _auth: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<RankingQuery>,
) -> AppResult<impl IntoResponse> {
    let roles = load_roles(&state.pool, &state.config.role_overrides).await?;
    let ranking =
        ledger::ranking(&state.pool, &roles, params.month, params.year, Utc::now()).await?;
    Ok(Json(DataResponse { data: ranking }))
}
