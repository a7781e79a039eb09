//! Response Envelopes
//!
//! JSON success bodies, the `{"error_id", "error"}` failure envelope, and
//! request body parsing.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use metrics::counter;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Body written for every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Correlates the response with the server log line; opaque to clients
    pub error_id: String,
    pub error: String,
}

/// Body written for a successful create
#[derive(Debug, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: i64,
}

/// A request failure, rendered as the error envelope.
///
/// `message` is what the client sees. `context` and `detail` only go to the
/// log, next to the generated error id.
#[derive(Debug, Error)]
#[error("{message} ({context}: {detail})")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub context: &'static str,
    pub detail: String,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        message: impl Into<String>,
        context: &'static str,
        detail: impl Display,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            context,
            detail: detail.to_string(),
        }
    }

    /// 400
    pub fn bad_request(message: impl Into<String>, context: &'static str, detail: impl Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, context, detail)
    }

    /// 404
    pub fn not_found(message: impl Into<String>, context: &'static str, detail: impl Display) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, context, detail)
    }

    /// 500
    pub fn internal(message: impl Into<String>, context: &'static str, detail: impl Display) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, context, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        error!(
            error_id = %error_id,
            status = self.status.as_u16(),
            context = self.context,
            detail = %self.detail,
            "{}",
            self.message
        );
        counter!("http_errors_total", "status" => self.status.as_u16().to_string()).increment(1);

        let body = ErrorResponse {
            error_id,
            error: self.message,
        };
        match serde_json::to_vec(&body) {
            Ok(bytes) => json_bytes(self.status, bytes),
            Err(e) => {
                // Nothing left to fall back to; send the bare status
                error!(encode_error = %e, "Failed to encode JSON payload for error response");
                self.status.into_response()
            }
        }
    }
}

fn json_bytes(status: StatusCode, bytes: Vec<u8>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        bytes,
    )
        .into_response()
}

/// Serialize `payload` as the response body.
///
/// Falls back to a 500 envelope if the payload cannot be encoded.
pub fn respond_json<T: Serialize + ?Sized>(status: StatusCode, payload: &T) -> Response {
    match serde_json::to_vec(payload) {
        Ok(bytes) => json_bytes(status, bytes),
        Err(e) => ApiError::internal("Failed to encode JSON payload", "encode_error", e).into_response(),
    }
}

/// JSON content type with no body
pub fn respond_empty(status: StatusCode) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
    )
        .into_response()
}

/// `{"id": id}`
pub fn respond_id(status: StatusCode, id: i64) -> Response {
    respond_json(status, &IdResponse { id })
}

/// Decode a JSON request body; malformed input is a client error
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request("Failed to parse JSON payload", "parse_json_body_error", e))
}
