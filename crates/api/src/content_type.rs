//! Content-Type Guard
//!
//! Requests that carry a body must declare `application/json`. Bodiless
//! requests pass through whatever their headers say.

use axum::{
    body::HttpBody,
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::response::ApiError;

const JSON: &str = "application/json";

/// `axum::middleware::from_fn` handler; 415 for non-JSON bodies
pub async fn require_json(request: Request, next: Next) -> Result<Response, ApiError> {
    let has_body = request.body().size_hint().exact() != Some(0);

    if has_body && !is_json(request.headers()) {
        let declared = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("<none>")
            .to_string();
        return Err(ApiError::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Unsupported content type",
            "content_type_error",
            declared,
        ));
    }

    Ok(next.run(request).await)
}

/// Media type ignoring parameters such as `charset`
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case(JSON))
}
