//! Printer relay handlers.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::DocketError;
use crate::protocol::encoder;
use crate::transport::QueueStatus;
use crate::transport::relay::TOKEN_HEADER;

use super::super::state::AppState;

fn check_token(state: &AppState, headers: &HeaderMap) -> Option<Response> {
    let presented = headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok());
    if state.authorized(presented) {
        return None;
    }
    warn!("Rejected printer request with missing or wrong token");
    Some(error_response(StatusCode::UNAUTHORIZED, "Invalid kiosk token"))
}

/// Handle POST /api/printer/print - queue a raw print stream.
///
/// Answers `202 Accepted` with the job id as soon as the job is queued.
/// Delivery happens in the background; outcomes show up in the status
/// endpoint.
pub async fn print(State(state): State<Arc<AppState>>, headers: HeaderMap, body: Bytes) -> Response {
    if let Some(rejected) = check_token(&state, &headers) {
        return rejected;
    }
    if body.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Print body cannot be empty");
    }

    let handle = state.client.submit(body.to_vec());
    info!(job_id = handle.job_id(), bytes = body.len(), "Relay accepted print job");
    (
        StatusCode::ACCEPTED,
        Json(json!({
            "success": true,
            "job_id": handle.job_id(),
        })),
    )
        .into_response()
}

/// Handle POST /api/printer/test - send the connection test and wait for it.
///
/// The request body is ignored.
pub async fn test(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(rejected) = check_token(&state, &headers) {
        return rejected;
    }

    match state.client.print(encoder::connection_test()).await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "job_id": report.job_id,
                "attempts": report.attempts,
            })),
        )
            .into_response(),
        Err(e @ DocketError::PrintFailed { .. }) => {
            error_response(StatusCode::BAD_GATEWAY, &e.to_string())
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}

/// Handle GET /api/printer/status - report the queue.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<QueueStatus> {
    Json(state.client.status())
}

fn error_response(status: StatusCode, error_msg: &str) -> Response {
    (status, Json(json!({ "success": false, "error": error_msg }))).into_response()
}
