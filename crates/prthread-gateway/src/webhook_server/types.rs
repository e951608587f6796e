//! Webhook response and error envelopes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

/// Error payload returned for rejected webhook calls.
#[derive(Debug)]
pub(super) struct WebhookApiError {
    pub(super) status: StatusCode,
    pub(super) code: &'static str,
    pub(super) message: String,
}

impl WebhookApiError {
    pub(super) fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub(super) fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub(super) fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "server_shutting_down",
            message,
        )
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": {
                    "code": self.code,
                    "message": self.message,
                }
            })),
        )
            .into_response()
    }
}

/// Body returned with `200 OK` once a notification has been accepted.
#[derive(Debug, Serialize)]
pub(super) struct WebhookAcceptedResponse {
    pub(super) status: &'static str,
    pub(super) pull_request_id: i64,
    pub(super) outcome: &'static str,
}
