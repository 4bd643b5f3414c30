//! Request body and query extractors that reject through [`AppError`].
//!
//! axum's own `Json` and `Query` answer malformed input with a plain-text
//! 4xx; these wrappers produce the `{error, code}` envelope with a 400.

use axum::extract::FromRequest;
use axum::extract::FromRequestParts;

use crate::error::AppError;

/// JSON request body. Shape errors become [`AppError::BadRequest`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Query string parameters. Parse errors become [`AppError::BadRequest`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
