//! Route definitions for the `/pins` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::pins;
use crate::state::AppState;

/// Routes mounted at `/pins`.
///
/// ```text
/// POST   /              -> give_pin
/// GET    /allowance     -> get_allowance
/// GET    /given         -> list_given
/// GET    /ranking       -> ranking  (?month=&year=)
/// DELETE /{id}          -> cancel_pin
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(pins::give_pin))
        .route("/allowance", get(pins::get_allowance))
        .route("/given", get(pins::list_given))
        .route("/ranking", get(pins::ranking))
        .route("/{id}", delete(pins::cancel_pin))
}
