//! Terminal pipeline stage: request in, HTML document out.
//!
//! # Responsibilities
//! - Validate the URL and resolve it to a manifest entry
//! - Build the render context and run the enrichment hook
//! - Load document, app and page modules
//! - Fetch and merge state, render app then document
//! - Write the response with its mandatory headers
//!
//! Failures are returned as `RequestFailure` for the host's error handler;
//! nothing here writes an error page.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, HeaderValue};
use axum::response::Response;
use serde_json::Value;

use crate::component::{
    Component, ComponentLoader, LoadedModule, ModuleLoadError, RenderMode, RenderScope,
    APP_MODULE, DOCUMENT_MODULE,
};
use crate::config::{GlobalsConfig, RextConfig};
use crate::manifest::ManifestLoader;
use crate::observability::metrics;
use crate::render::context::{ContextHook, RenderContext};
use crate::render::data::fetch_state;
use crate::render::document::DocumentProps;
use crate::render::error::{RenderError, RequestFailure, RextError};
use crate::render::head::{Head, HeadTags};
use crate::render::markup::{mark_hydration_root, DOCTYPE};
use crate::routing::{decode_uri, parse_query};

/// Output of rendering the app: the hydratable fragment and the head tags
/// its components collected.
#[derive(Debug, Clone)]
pub struct AppRender {
    pub html: String,
    pub head: HeadTags,
}

/// Render the app wrapping the page, collecting head tags on the way.
pub fn render_app(
    app: &dyn Component,
    page: &dyn Component,
    state: Option<&Value>,
) -> Result<AppRender, RenderError> {
    let null = Value::Null;
    let props = state.unwrap_or(&null);
    let mut head = Head::default();

    let html = {
        let mut scope = RenderScope::new(RenderMode::Hydratable, props, &mut head).with_child(page);
        app.render(&mut scope)?
    };

    Ok(AppRender {
        html: mark_hydration_root(&html),
        head: head.render(),
    })
}

/// Render the document shell as static markup.
pub fn render_document(document: &dyn Component, props: &DocumentProps) -> Result<String, RenderError> {
    let null = Value::Null;
    let mut head = Head::default();
    let mut scope = RenderScope::new(RenderMode::Static, &null, &mut head).with_document(props);
    document.render(&mut scope)
}

pub struct Renderer {
    manifest: Arc<ManifestLoader>,
    components: Arc<ComponentLoader>,
    context_hook: Option<ContextHook>,
    globals: GlobalsConfig,
    public_path: String,
}

impl Renderer {
    pub fn new(
        manifest: Arc<ManifestLoader>,
        components: Arc<ComponentLoader>,
        globals: GlobalsConfig,
        public_path: impl Into<String>,
    ) -> Self {
        Self {
            manifest,
            components,
            context_hook: None,
            globals,
            public_path: public_path.into(),
        }
    }

    pub fn from_config(
        config: &RextConfig,
        manifest: Arc<ManifestLoader>,
        components: Arc<ComponentLoader>,
    ) -> Self {
        Self::new(
            manifest,
            components,
            config.globals.clone(),
            config.build.public_path.clone(),
        )
    }

    pub fn with_context_hook(mut self, hook: Option<ContextHook>) -> Self {
        self.context_hook = hook;
        self
    }

    pub async fn render(&self, request: Request) -> Result<Response, RequestFailure> {
        let start = Instant::now();
        let (parts, _body) = request.into_parts();

        // The whole URL must decode, query included.
        let raw = parts.uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
        decode_uri(raw).map_err(RextError::from)?;
        let path = decode_uri(parts.uri.path()).map_err(RextError::from)?;

        let routing = self.manifest.current();
        let route = routing
            .table
            .match_path(parts.uri.path())
            .map_err(RextError::from)?
            .ok_or_else(|| RextError::NoRoute { path: path.clone() })?;

        tracing::debug!(entry = %route.entry, path = %path, "Rendering entry");

        let assets = routing.manifest.classify(&route.entry);
        let query = parse_query(parts.uri.query());

        let mut ctx = RenderContext::new(parts.method, parts.uri, parts.headers, path, route.entry.clone())
            .with_params(route.params)
            .with_query(query);
        if let Some(hook) = &self.context_hook {
            ctx = hook(ctx);
        }

        let (document, app, page) = self.load_modules(route.entry.clone()).await?;

        let state = fetch_state(&app, &page, &ctx).await?;

        let rendered = render_app(&*app.component, &*page.component, state.as_ref())
            .map_err(RextError::from)?;

        let props = DocumentProps {
            body: rendered.html,
            page_scripts: assets.scripts,
            page_styles: assets.styles,
            state,
            head: rendered.head,
            context: self.globals.context.clone(),
            id: self.globals.id.clone(),
            public_path: self.public_path.clone(),
        };
        let content = render_document(&*document.component, &props).map_err(RextError::from)?;

        let html = format!("{}{}", DOCTYPE, content);
        let length = html.len();

        let mut response = Response::new(Body::from(html));
        ctx.response().apply(&mut response);
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
        headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("none"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));

        metrics::record_request(&route.entry, response.status().as_u16(), start);
        Ok(response)
    }
}

impl Renderer {
    /// Load document, app and page on the blocking pool; module sources may
    /// read from disk.
    async fn load_modules(
        &self,
        entry: String,
    ) -> Result<(LoadedModule, LoadedModule, LoadedModule), RextError> {
        let components = self.components.clone();
        let loaded = tokio::task::spawn_blocking(move || {
            let document = components.load_entry(DOCUMENT_MODULE)?;
            let app = components.load_entry(APP_MODULE)?;
            let page = components.load_entry(&entry)?;
            Ok::<_, ModuleLoadError>((document, app, page))
        })
        .await
        .map_err(|e| RenderError::new(format!("module load task failed: {}", e)))?;
        Ok(loaded?)
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("manifest", &self.manifest)
            .field("components", &self.components)
            .field("context_hook", &self.context_hook.is_some())
            .finish()
    }
}
