pub mod assessments;
pub mod health;
pub mod periods;
pub mod pins;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /pins                                            give (POST)
/// /pins/allowance                                  caller's allowance (GET)
/// /pins/given                                      pins the caller gave (GET)
/// /pins/ranking                                    monthly ranking (GET, ?month=&year=)
/// /pins/{id}                                       cancel (DELETE)
///
/// /assessments/assignments                         caller's assessees (GET)
/// /assessments/submit                              submit responses (POST)
/// /assessments/results/{assessee_id}               aspect scores (GET, ?period_id=)
/// /assessments/team-performance                    dashboard (GET, supervisor/admin)
///
/// /admin/periods/{kind}                            list, create (admin only)
/// /admin/periods/{kind}/{id}/activate              activate (POST)
/// /admin/periods/{kind}/{id}/complete              complete (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/pins", pins::router())
        .nest("/assessments", assessments::router())
        .nest("/admin/periods", periods::router())
}
