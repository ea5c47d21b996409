//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use rext::component::{
    component, data_fetch, DefaultApp, DefaultDocument, LoadedModule, ModuleExports,
    ModuleLoadError, ModuleRegistry, ModuleSource, APP_MODULE, DOCUMENT_MODULE,
};
use rext::config::RextConfig;
use rext::manifest::{ManifestReader, MemoryFs};
use rext::render::RenderContext;

pub const MANIFEST: &str = r#"{
    "index": ["index.js"],
    "about": ["about.js", "about.css", "about.js.map"],
    "blog/_id": ["blog.js"],
    "_error": ["error.js"]
}"#;

pub fn config(dev: bool) -> RextConfig {
    let mut config = RextConfig::default();
    config.dev = dev;
    config.dir.root = "/app".into();
    config
}

/// In-memory filesystem holding `manifest` where `config` looks for it.
pub fn manifest_fs(config: &RextConfig, manifest: &str) -> MemoryFs {
    MemoryFs::new().with_file(config.manifest_path(), manifest)
}

/// Document, app and the pages named in `MANIFEST`.
pub fn pages(config: &RextConfig) -> ModuleRegistry {
    ModuleRegistry::for_config(config)
        .with(DOCUMENT_MODULE, ModuleExports::component(DefaultDocument))
        .with(APP_MODULE, ModuleExports::component(DefaultApp))
        .with(
            "index",
            ModuleExports::shared(component(|scope| {
                scope.head().set_title("Home");
                Ok("<h1>home</h1>".into())
            })),
        )
        .with(
            "about",
            ModuleExports::shared(component(|scope| {
                scope.head().set_title("About");
                scope.head().meta([("name", "description"), ("content", "about us")]);
                Ok("<h1>about</h1>".into())
            })),
        )
        .with(
            "blog/_id",
            ModuleExports::shared(component(|scope| {
                let id = scope.prop("id").and_then(Value::as_str).unwrap_or("?");
                Ok(format!("<article>post {}</article>", id))
            }))
            .with_data_fetch(data_fetch(|ctx: RenderContext| async move {
                Ok(Some(json!({ "id": ctx.param("id").unwrap_or_default() })))
            })),
        )
        .with(
            "_error",
            ModuleExports::shared(component(|_| Ok("<h1>not found</h1>".into()))),
        )
}

/// Wraps a module source and counts loads.
pub struct CountingSource<S> {
    inner: S,
    loads: AtomicUsize,
}

impl<S> CountingSource<S> {
    pub fn new(inner: S) -> Arc<Self> {
        Arc::new(Self {
            inner,
            loads: AtomicUsize::new(0),
        })
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl<S: ModuleSource> ModuleSource for CountingSource<S> {
    fn load(&self, path: &Path) -> Result<LoadedModule, ModuleLoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(path)
    }
}

/// Wraps a manifest reader and counts reads.
pub struct CountingReader<R> {
    inner: R,
    reads: AtomicUsize,
}

impl<R> CountingReader<R> {
    pub fn new(inner: R) -> Arc<Self> {
        Arc::new(Self {
            inner,
            reads: AtomicUsize::new(0),
        })
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl<R: ManifestReader> ManifestReader for CountingReader<R> {
    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_to_string(path)
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    send(router, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}
