//! Centralized error handling.
//!
//! # Responsibilities
//! - Turn a `RequestFailure` into the response the client sees
//! - Log per-request failures once, at a level matching the status
//!
//! # Design Decisions
//! - Tagged status wins; untagged "no route" is 404, anything else 500
//! - Plain-text bodies; the error chain is shown only in development

use std::error::Error;

use axum::http::{header, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::render::{RequestFailure, RextError};

pub trait ErrorHandler: Send + Sync {
    fn handle(&self, failure: RequestFailure, uri: &Uri) -> Response;
}

impl<F> ErrorHandler for F
where
    F: Fn(RequestFailure, &Uri) -> Response + Send + Sync,
{
    fn handle(&self, failure: RequestFailure, uri: &Uri) -> Response {
        self(failure, uri)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorHandler {
    dev: bool,
}

impl DefaultErrorHandler {
    pub fn new(dev: bool) -> Self {
        Self { dev }
    }
}

/// Status a failure is answered with.
pub fn failure_status(failure: &RequestFailure) -> StatusCode {
    match (failure.status, &failure.error) {
        (Some(status), _) => status,
        (None, RextError::NoRoute { .. }) => StatusCode::NOT_FOUND,
        (None, _) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ErrorHandler for DefaultErrorHandler {
    fn handle(&self, failure: RequestFailure, uri: &Uri) -> Response {
        let status = failure_status(&failure);
        if status.is_server_error() {
            tracing::error!(uri = %uri, status = %status, error = %failure.error, "Request failed");
        } else {
            tracing::warn!(uri = %uri, status = %status, error = %failure.error, "Request failed");
        }

        let mut body = status
            .canonical_reason()
            .unwrap_or("Error")
            .to_string();
        if self.dev {
            body.push_str("\n\n");
            body.push_str(&failure.error.to_string());
            let mut source = failure.error.source();
            while let Some(cause) = source {
                body.push_str("\ncaused by: ");
                body.push_str(&cause.to_string());
                source = cause.source();
            }
        }

        let mut response = (status, body).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DataRole, RenderError};
    use crate::routing::DecodeError;

    #[test]
    fn test_status_mapping() {
        let tagged = RequestFailure::from(RextError::Decode(DecodeError::InvalidUtf8("%c3".into())));
        assert_eq!(failure_status(&tagged), StatusCode::BAD_REQUEST);

        let no_route = RequestFailure::from(RextError::NoRoute { path: "/x".into() });
        assert_eq!(failure_status(&no_route), StatusCode::NOT_FOUND);

        let render = RequestFailure::from(RextError::Render(RenderError::new("boom")));
        assert_eq!(failure_status(&render), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_dev_body_includes_chain() {
        let failure = RequestFailure::from(RextError::DataFetch {
            role: DataRole::App,
            source: "db down".into(),
        });
        let uri = Uri::from_static("/");

        let response = DefaultErrorHandler::new(true).handle(failure, &uri);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.starts_with("Internal Server Error"));
        assert!(body.contains("caused by: db down"));
    }

    #[tokio::test]
    async fn test_production_body_is_terse() {
        let failure = RequestFailure::from(RextError::Render(RenderError::new("secret detail")));
        let response = DefaultErrorHandler::new(false).handle(failure, &Uri::from_static("/"));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Internal Server Error");
    }
}
