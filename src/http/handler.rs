//! Endpoint handlers.

use std::time::Instant;

use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Form, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::error::ExchangeError;
use crate::http::request::request_id;
use crate::http::response::{analysis_response, error_response};
use crate::http::server::AppState;
use crate::observability::metrics;

/// Decoded analysis request fields.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeForm {
    pub text: Option<String>,
}

/// Analyze the `text` field of the form body or the query string.
///
/// A form body value wins over a query value. A body that is not a form
/// (any other content type, or none) contributes no fields, and a missing
/// `text` reads as empty.
pub async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<AnalyzeForm>, QueryRejection>,
    form: Result<Form<AnalyzeForm>, FormRejection>,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers);

    let response = match decode_text(query, form) {
        Ok(text) => match state.gateway.analyze(text).await {
            Ok(line) => analysis_response(line),
            Err(err) => {
                log_failure(request_id, &err);
                error_response(&err)
            }
        },
        Err(reason) => {
            tracing::error!(request_id = %request_id, error = %reason, "Failed to decode form");
            (StatusCode::INTERNAL_SERVER_ERROR, reason).into_response()
        }
    };

    metrics::record_request(response.status().as_u16(), start);
    response
}

fn decode_text(
    query: Result<Query<AnalyzeForm>, QueryRejection>,
    form: Result<Form<AnalyzeForm>, FormRejection>,
) -> Result<String, String> {
    let from_body = match form {
        Ok(Form(form)) => form.text,
        Err(FormRejection::InvalidFormContentType(_)) => None,
        Err(rejection) => return Err(rejection.body_text()),
    };
    let from_query = match query {
        Ok(Query(query)) => query.text,
        Err(rejection) => return Err(rejection.body_text()),
    };
    Ok(from_body.or(from_query).unwrap_or_default())
}

fn log_failure(request_id: &str, err: &ExchangeError) {
    match err {
        ExchangeError::EmptyInput => {
            tracing::debug!(request_id = %request_id, "Empty input, nothing to analyze")
        }
        ExchangeError::Timeout(_) | ExchangeError::Busy(_) => {
            tracing::warn!(request_id = %request_id, kind = err.kind(), error = %err, "Analysis failed")
        }
        ExchangeError::Io(_) | ExchangeError::Aborted(_) => {
            tracing::error!(request_id = %request_id, kind = err.kind(), error = %err, "Analysis failed")
        }
    }
}

/// Liveness, queue depth, and analyzer pipe state.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let (status, analyzer) = match state.gateway.analyzer_in_sync() {
        Some(true) => ("operational", "idle"),
        Some(false) => ("degraded", "out_of_sync"),
        None => ("operational", "busy"),
    };
    Json(serde_json::json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "analyzer": analyzer,
        "waiting": state.gateway.waiting(),
        "deadline_ms": state.gateway.deadline().as_millis() as u64,
    }))
}
