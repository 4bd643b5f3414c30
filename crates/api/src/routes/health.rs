use apresiasi_core::period::PeriodKind;
use apresiasi_core::types::DbId;
use apresiasi_db::repositories::PeriodRepo;
use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Pin quota this instance enforces.
    pub pin_quota: i32,
    /// Id of the active assessment period, if one is configured.
    pub active_assessment_period: Option<DbId>,
    /// Id of the active pin period; gives are rejected without one.
    pub active_pin_period: Option<DbId>,
}

/// GET /health -- service, database and period status.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = apresiasi_db::health_check(&state.pool).await.is_ok();

    let (active_assessment_period, active_pin_period) = if db_healthy {
        (
            active_period_id(&state, PeriodKind::Assessment).await,
            active_period_id(&state, PeriodKind::Pin).await,
        )
    } else {
        (None, None)
    };

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        pin_quota: state.config.pin_quota,
        active_assessment_period,
        active_pin_period,
    })
}

async fn active_period_id(state: &AppState, kind: PeriodKind) -> Option<DbId> {
    match PeriodRepo::find_active(&state.pool, kind).await {
        Ok(period) => period.map(|p| p.id),
        Err(e) => {
            tracing::warn!(kind = %kind, error = %e, "Health check could not read active period");
            None
        }
    }
}

/// Mount health check routes (root level, not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
