// ABOUTME: Request tracing span construction for correlation and structured logging
// ABOUTME: Reuses an incoming x-request-id header or generates one per request

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info_span, Span};
use uuid::Uuid;

use crate::errors::ErrorResponse;

/// Header carrying the request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id from the header, or a fresh one
#[must_use]
pub fn request_id(request: &Request<Body>) -> String {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map_or_else(|| format!("req_{}", Uuid::new_v4().simple()), str::to_owned)
}

/// Span factory for `tower_http::trace::TraceLayer`
pub fn make_request_span(request: &Request<Body>) -> Span {
    info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id(request),
    )
}

/// Pin one request id for the whole request
///
/// The id is written back onto the request so the trace span sees it, echoed
/// in the `x-request-id` response header and stamped into `AppError` bodies.
pub async fn propagate_request_id(mut request: Request<Body>, next: Next) -> Response {
    let id = request_id(&request);
    let header = HeaderValue::from_str(&id).ok();
    if let Some(value) = &header {
        request.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
    }

    let mut response = next.run(request).await;
    if let Some(error) = response.extensions_mut().remove::<ErrorResponse>() {
        let (parts, _) = response.into_parts();
        let body = Json(error.with_request_id(id)).into_response().into_body();
        response = Response::from_parts(parts, body);
    }
    if let Some(value) = header {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_prefers_header() {
        let request = Request::builder()
            .header(REQUEST_ID_HEADER, "abc-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_id(&request), "abc-123");

        let generated = request_id(&Request::new(Body::empty()));
        assert!(generated.starts_with("req_"));
    }
}
