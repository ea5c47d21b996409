//! Per-request render context.
//!
//! # Responsibilities
//! - Carry request data, route params and query to data functions
//! - Expose a response head data functions may set (status, headers)
//! - Run the optional enrichment hook

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::Response;
use serde_json::{Map, Value};

/// Enrichment hook run once per request before any data function.
pub type ContextHook = Arc<dyn Fn(RenderContext) -> RenderContext + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RenderContext {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    /// Decoded request path.
    pub path: String,
    /// Matched manifest entry.
    pub entry: String,
    pub params: HashMap<String, String>,
    pub query: HashMap<String, String>,
    /// Free-form values added by the context hook.
    pub extensions: Map<String, Value>,
    response: ResponseHead,
}

impl RenderContext {
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        path: impl Into<String>,
        entry: impl Into<String>,
    ) -> Self {
        Self {
            method,
            uri,
            headers,
            path: path.into(),
            entry: entry.into(),
            params: HashMap::new(),
            query: HashMap::new(),
            extensions: Map::new(),
            response: ResponseHead::default(),
        }
    }

    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// The response being built. Clones of a context share it.
    pub fn response(&self) -> &ResponseHead {
        &self.response
    }
}

#[derive(Debug, Default)]
struct HeadState {
    status: Option<StatusCode>,
    headers: HeaderMap,
}

/// Status and headers set during data fetching, applied to the final
/// response before the renderer's own headers.
#[derive(Debug, Clone, Default)]
pub struct ResponseHead {
    inner: Arc<Mutex<HeadState>>,
}

impl ResponseHead {
    pub fn set_status(&self, status: StatusCode) {
        self.lock().status = Some(status);
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.lock().status
    }

    pub fn insert_header(&self, name: HeaderName, value: HeaderValue) {
        self.lock().headers.insert(name, value);
    }

    pub fn header(&self, name: &HeaderName) -> Option<HeaderValue> {
        self.lock().headers.get(name).cloned()
    }

    pub fn apply(&self, response: &mut Response) {
        let state = self.lock();
        if let Some(status) = state.status {
            *response.status_mut() = status;
        }
        for (name, value) in state.headers.iter() {
            response.headers_mut().insert(name.clone(), value.clone());
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HeadState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn test_response_head_shared_between_clones() {
        let ctx = RenderContext::new(Method::GET, Uri::from_static("/a"), HeaderMap::new(), "/a", "a");
        let copy = ctx.clone();
        copy.response().set_status(StatusCode::NOT_FOUND);
        copy.response()
            .insert_header(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

        assert_eq!(ctx.response().status(), Some(StatusCode::NOT_FOUND));

        let mut response = Response::new(axum::body::Body::empty());
        ctx.response().apply(&mut response);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    }
}
