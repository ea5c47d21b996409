//! Request ids and the outer tracing layer.
//!
//! # Responsibilities
//! - Generate a UUID request id when the client sent none
//! - Echo the id on the response
//! - Open one tracing span per request carrying the id
//!
//! # Design Decisions
//! - Id assigned outermost so every span and log line can carry it

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderName};
use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

pub fn request_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(&X_REQUEST_ID).and_then(|v| v.to_str().ok())
}

/// Wrap the assembled pipeline with request id and trace layers.
pub fn layers(router: Router) -> Router {
    router
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = request_id(request.headers()).unwrap_or("unknown"),
            )
        }))
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
}
