//! Response encoding.
//!
//! # Responsibilities
//! - Forward the analyzer's line verbatim as `application/json`
//! - Map exchange errors to HTTP status codes
//!
//! # Design Decisions
//! - The analyzer output is opaque; it is never parsed or re-serialized
//! - Empty input is 204, every pipe or deadline failure is 500
//! - A full admission queue (only when bounded) is 503

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::ExchangeError;

/// Successful analysis: the analyzer line as the JSON body.
pub fn analysis_response(line: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        line,
    )
        .into_response()
}

/// HTTP status for a failed exchange.
pub fn status_for(err: &ExchangeError) -> StatusCode {
    match err {
        ExchangeError::EmptyInput => StatusCode::NO_CONTENT,
        ExchangeError::Busy(_) => StatusCode::SERVICE_UNAVAILABLE,
        ExchangeError::Io(_) | ExchangeError::Timeout(_) | ExchangeError::Aborted(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Failed exchange: status plus the error text (no body for 204).
pub fn error_response(err: &ExchangeError) -> Response {
    match status_for(err) {
        StatusCode::NO_CONTENT => StatusCode::NO_CONTENT.into_response(),
        status => (status, err.to_string()).into_response(),
    }
}
