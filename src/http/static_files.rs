//! Static build assets, scoped to the static route.
//!
//! Only GET and HEAD are served. A file that does not exist falls through to
//! the rest of the pipeline instead of answering 404.

use std::path::PathBuf;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::http::stage::{handler, strip_scope, Stage};

pub fn stage(route: &str, dir: impl Into<PathBuf>) -> Stage {
    let dir = dir.into();
    let prefix = route.trim_end_matches('/').to_string();
    let serve = ServeDir::new(&dir);
    tracing::debug!(route = %prefix, dir = ?dir, "Serving static assets");

    Stage::scoped(
        prefix.clone(),
        handler(move |request: Request, next: Next| {
            let serve = serve.clone();
            let prefix = prefix.clone();
            async move {
                if !matches!(*request.method(), Method::GET | Method::HEAD) {
                    return next.run(request).await;
                }
                let Some(uri) = strip_scope(request.uri(), &prefix) else {
                    return next.run(request).await;
                };

                let mut asset_request = Request::new(Body::empty());
                *asset_request.method_mut() = request.method().clone();
                *asset_request.uri_mut() = uri;
                *asset_request.version_mut() = request.version();
                *asset_request.headers_mut() = request.headers().clone();

                let response = match serve.oneshot(asset_request).await {
                    Ok(response) => response,
                    Err(never) => match never {},
                };
                if response.status() == StatusCode::NOT_FOUND {
                    return next.run(request).await;
                }
                response.map(Body::new)
            }
        }),
    )
}
