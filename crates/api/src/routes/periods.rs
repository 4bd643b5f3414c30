//! Route definitions for `/admin/periods`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::periods;
use crate::state::AppState;

/// Routes mounted at `/admin/periods`.
///
/// ```text
/// GET  /{kind}                  -> list_periods
/// POST /{kind}                  -> create_period
/// POST /{kind}/{id}/activate    -> activate_period
/// POST /{kind}/{id}/complete    -> complete_period
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{kind}",
            get(periods::list_periods).post(periods::create_period),
        )
        .route("/{kind}/{id}/activate", post(periods::activate_period))
        .route("/{kind}/{id}/complete", post(periods::complete_period))
}
