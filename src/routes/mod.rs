pub mod account;
pub mod activity;
pub mod auth;

use axum::http::StatusCode;
use axum::Json;

use crate::models::StatusMsg;

/// Error side of every handler: an HTTP status plus the standard envelope.
pub type ErrorResponse = (StatusCode, Json<StatusMsg>);

pub fn db_err<E: std::fmt::Display>(e: E) -> ErrorResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(StatusMsg::danger(format!("DB error: {e}"))),
    )
}

pub fn validation_err(message: impl Into<String>) -> ErrorResponse {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(StatusMsg::warning(message)),
    )
}
