//! Route definitions for the `/assessments` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::assessments;
use crate::state::AppState;

/// Routes mounted at `/assessments`.
///
/// ```text
/// GET  /assignments                 -> list_my_assignments
/// POST /submit                      -> submit
/// GET  /results/{assessee_id}       -> results           (?period_id=)
/// GET  /team-performance            -> team_performance  (?period_id=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/assignments", get(assessments::list_my_assignments))
        .route("/submit", post(assessments::submit))
        .route("/results/{assessee_id}", get(assessments::results))
        .route("/team-performance", get(assessments::team_performance))
}
