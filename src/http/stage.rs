//! Pipeline stages.
//!
//! A stage is either global or scoped to a path prefix. Stages run in the
//! order they were assembled; each one either answers the request or hands
//! it to `next`.

use std::future::Future;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::Uri;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use futures_util::future::BoxFuture;

pub type Handler = Arc<dyn Fn(Request, Next) -> BoxFuture<'static, Response> + Send + Sync>;

/// Wrap an async function as a stage handler.
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |request, next| Box::pin(f(request, next)))
}

#[derive(Clone)]
pub enum Stage {
    /// Runs for every request.
    Global(Handler),
    /// Runs only for paths under `prefix`; other requests skip it.
    Scoped { prefix: String, handler: Handler },
}

impl Stage {
    pub fn global(handler: Handler) -> Self {
        Stage::Global(handler)
    }

    pub fn scoped(prefix: impl Into<String>, handler: Handler) -> Self {
        let prefix = prefix.into();
        let prefix = prefix.trim_end_matches('/').to_string();
        Stage::Scoped { prefix, handler }
    }

    pub fn applies_to(&self, path: &str) -> bool {
        match self {
            Stage::Global(_) => true,
            Stage::Scoped { prefix, .. } => in_scope(prefix, path),
        }
    }

    pub async fn call(&self, request: Request, next: Next) -> Response {
        match self {
            Stage::Global(handler) => handler(request, next).await,
            Stage::Scoped { prefix, handler } => {
                if in_scope(prefix, request.uri().path()) {
                    handler(request, next).await
                } else {
                    next.run(request).await
                }
            }
        }
    }

    /// Wrap `router` so this stage runs before it.
    pub fn apply(self, router: Router) -> Router {
        router.layer(middleware::from_fn(move |request: Request, next: Next| {
            let stage = self.clone();
            async move { stage.call(request, next).await }
        }))
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Global(_) => f.write_str("Stage::Global"),
            Stage::Scoped { prefix, .. } => write!(f, "Stage::Scoped({:?})", prefix),
        }
    }
}

/// Layer `stages` onto `router` so the first stage runs first.
pub fn assemble(router: Router, stages: Vec<Stage>) -> Router {
    stages
        .into_iter()
        .rev()
        .fold(router, |router, stage| stage.apply(router))
}

/// Prefix match on a segment boundary, ignoring ASCII case. An empty prefix
/// covers everything.
pub fn in_scope(prefix: &str, path: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match path.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => {
            matches!(path.as_bytes().get(prefix.len()), None | Some(b'/') | Some(b'.'))
        }
        _ => false,
    }
}

/// `uri` with `prefix` removed from its path, query kept. `None` when the
/// path is not under the prefix as a directory.
pub fn strip_scope(uri: &Uri, prefix: &str) -> Option<Uri> {
    let path = uri.path();
    if !in_scope(prefix, path) {
        return None;
    }
    let rest = match path.get(prefix.len()..)? {
        "" => "/",
        rest if rest.starts_with('/') => rest,
        _ => return None,
    };
    let stripped = match uri.query() {
        Some(query) => format!("{}?{}", rest, query),
        None => rest.to_string(),
    };
    stripped.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_scope() {
        assert!(in_scope("/static", "/static"));
        assert!(in_scope("/static", "/static/a.js"));
        assert!(in_scope("/static", "/STATIC/a.js"));
        assert!(in_scope("/static", "/static.json"));
        assert!(!in_scope("/static", "/statics/a.js"));
        assert!(!in_scope("/static", "/"));
        assert!(in_scope("", "/anything"));
    }

    #[test]
    fn test_strip_scope() {
        let uri: Uri = "/static/js/a.js?v=1".parse().unwrap();
        assert_eq!(strip_scope(&uri, "/static").unwrap(), "/js/a.js?v=1");

        let uri: Uri = "/static".parse().unwrap();
        assert_eq!(strip_scope(&uri, "/static").unwrap(), "/");

        let uri: Uri = "/static.json".parse().unwrap();
        assert!(strip_scope(&uri, "/static").is_none());
    }

    #[test]
    fn test_scoped_prefix_normalized() {
        let stage = Stage::scoped("/api/", handler(|req, next: Next| next.run(req)));
        assert!(stage.applies_to("/api/x"));
        assert!(!stage.applies_to("/apix"));
    }
}
