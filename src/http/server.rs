//! Pipeline host.
//!
//! # Responsibilities
//! - Own the manifest loader, component loader and renderer
//! - Assemble the stage pipeline in its fixed order
//! - Load the manifest once at startup (production)
//! - Consume the development update channel
//! - Bind, serve and shut down gracefully

use std::future::Future;
use std::io;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Instant;

use arc_swap::{ArcSwap, ArcSwapOption};
use axum::extract::{Request, State};
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;

use crate::component::{
    ComponentLoader, DefaultApp, DefaultDocument, FragmentSource, ModuleExports, ModuleRegistry,
    ModuleSource, APP_MODULE, DOCUMENT_MODULE,
};
use crate::config::validation::validate_config;
use crate::config::{ConfigError, RextConfig};
use crate::http::compression::Compressor;
use crate::http::dev::{self, DevReceiver, DevUpdate};
use crate::http::request;
use crate::http::response::{DefaultErrorHandler, ErrorHandler};
use crate::http::stage::{self, Handler, Stage};
use crate::http::static_files;
use crate::manifest::{DiskFs, ManifestLoader, ManifestReader, Routing};
use crate::observability::metrics;
use crate::render::{ContextHook, RenderContext, Renderer};

/// Modules used when the caller supplies none: built-in document and app,
/// pages read as HTML fragments from the server build directory.
pub fn default_modules(config: &RextConfig) -> ModuleRegistry {
    ModuleRegistry::for_config(config)
        .with(DOCUMENT_MODULE, ModuleExports::component(DefaultDocument))
        .with(APP_MODULE, ModuleExports::component(DefaultApp))
        .with_fallback(Arc::new(FragmentSource))
}

pub struct ServerBuilder {
    config: RextConfig,
    modules: Option<Arc<dyn ModuleSource>>,
    reader: Option<Arc<dyn ManifestReader>>,
    stages: Vec<Stage>,
    compressor: Option<Compressor>,
    context_hook: Option<ContextHook>,
    error_handler: Option<Arc<dyn ErrorHandler>>,
    dev_updates: Option<DevReceiver>,
}

impl ServerBuilder {
    pub fn modules(mut self, modules: Arc<dyn ModuleSource>) -> Self {
        self.modules = Some(modules);
        self
    }

    /// Where the manifest is read from. Defaults to the real filesystem.
    pub fn manifest_reader(mut self, reader: Arc<dyn ManifestReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Append a user stage. User stages run in the order added, after the
    /// built-in ones and before the renderer.
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stages(mut self, stages: impl IntoIterator<Item = Stage>) -> Self {
        self.stages.extend(stages);
        self
    }

    /// Override the configured compressor, e.g. with `Compressor::Custom`.
    pub fn compressor(mut self, compressor: Compressor) -> Self {
        self.compressor = Some(compressor);
        self
    }

    pub fn context_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(RenderContext) -> RenderContext + Send + Sync + 'static,
    {
        self.context_hook = Some(Arc::new(hook));
        self
    }

    pub fn error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Receiving half of the development update channel.
    pub fn dev_updates(mut self, updates: DevReceiver) -> Self {
        self.dev_updates = Some(updates);
        self
    }

    pub fn build(self) -> Result<Server, ConfigError> {
        validate_config(&self.config).map_err(ConfigError::Validation)?;
        let config = self.config;

        let modules: Arc<dyn ModuleSource> = match self.modules {
            Some(modules) => modules,
            None => Arc::new(default_modules(&config)),
        };
        let reader: Arc<dyn ManifestReader> = match self.reader {
            Some(reader) => reader,
            None => Arc::new(DiskFs),
        };
        let error_handler: Arc<dyn ErrorHandler> = match self.error_handler {
            Some(handler) => handler,
            None => Arc::new(DefaultErrorHandler::new(config.dev)),
        };

        let manifest = Arc::new(ManifestLoader::new(config.manifest_path(), config.router));
        let components = Arc::new(ComponentLoader::from_config(&config, modules));
        let renderer = Renderer::from_config(&config, manifest.clone(), components.clone())
            .with_context_hook(self.context_hook);

        let host = Arc::new(Host {
            renderer,
            manifest,
            components,
            reader: ArcSwap::from_pointee(reader),
            hot_reload: Arc::new(ArcSwapOption::empty()),
            error_handler,
        });

        Ok(Server {
            compressor: self
                .compressor
                .unwrap_or_else(|| Compressor::from_config(&config.server.compressor)),
            config,
            host,
            stages: self.stages,
            dev_updates: Mutex::new(self.dev_updates),
            router: OnceLock::new(),
        })
    }
}

/// Shared by every request.
struct Host {
    renderer: Renderer,
    manifest: Arc<ManifestLoader>,
    components: Arc<ComponentLoader>,
    reader: ArcSwap<Arc<dyn ManifestReader>>,
    hot_reload: Arc<ArcSwapOption<Handler>>,
    error_handler: Arc<dyn ErrorHandler>,
}

impl Host {
    fn reload_manifest(&self) -> usize {
        let reader = self.reader.load_full();
        self.manifest.load(reader.as_ref().as_ref())
    }

    fn apply(&self, update: DevUpdate) {
        tracing::debug!(update = ?update, "Applying dev update");
        match update {
            DevUpdate::Filesystem(fs) => {
                let reader: Arc<dyn ManifestReader> = fs;
                self.reader.store(Arc::new(reader));
                self.reload_manifest();
            }
            DevUpdate::Modules(source) => self.components.replace_source(source),
            DevUpdate::HotReload(handler) => {
                self.hot_reload.store(Some(Arc::new(handler)));
                tracing::info!("Hot-reload handler registered");
            }
            DevUpdate::ManifestChanged => {
                self.reload_manifest();
            }
        }
    }
}

pub struct Server {
    config: RextConfig,
    host: Arc<Host>,
    stages: Vec<Stage>,
    compressor: Compressor,
    dev_updates: Mutex<Option<DevReceiver>>,
    router: OnceLock<Router>,
}

impl Server {
    pub fn builder(config: RextConfig) -> ServerBuilder {
        ServerBuilder {
            config,
            modules: None,
            reader: None,
            stages: Vec::new(),
            compressor: None,
            context_hook: None,
            error_handler: None,
            dev_updates: None,
        }
    }

    pub fn config(&self) -> &RextConfig {
        &self.config
    }

    /// Current manifest and route table.
    pub fn routing(&self) -> Arc<Routing> {
        self.host.manifest.current()
    }

    pub fn components(&self) -> &ComponentLoader {
        &self.host.components
    }

    /// Apply a development update directly, bypassing the channel.
    pub fn apply_dev_update(&self, update: DevUpdate) {
        self.host.apply(update);
    }

    /// Start up once and return the assembled pipeline. Later calls return
    /// the same pipeline without repeating startup.
    pub fn ready(&self) -> Router {
        self.router.get_or_init(|| self.start()).clone()
    }

    fn start(&self) -> Router {
        if self.config.dev {
            self.consume_dev_updates();
        } else {
            self.host.reload_manifest();
        }
        self.assemble()
    }

    fn consume_dev_updates(&self) {
        let receiver = self
            .dev_updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(mut receiver) = receiver else {
            tracing::debug!("No dev update channel; waiting on direct updates");
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let host = self.host.clone();
                runtime.spawn(async move {
                    while let Some(update) = receiver.recv().await {
                        host.apply(update);
                    }
                    tracing::debug!("Dev update channel closed");
                });
            }
            Err(_) => {
                tracing::warn!("No async runtime at startup; dev updates will not be consumed");
            }
        }
    }

    fn assemble(&self) -> Router {
        let mut stages = Vec::new();
        if self.config.dev {
            stages.push(dev::passthrough(self.host.hot_reload.clone()));
        } else {
            stages.extend(self.compressor.stage());
            if !self.config.assets_are_external() {
                stages.push(static_files::stage(
                    &self.config.static_route(),
                    self.config.static_dir(),
                ));
            }
        }
        stages.extend(self.stages.iter().cloned());
        tracing::debug!(stages = stages.len(), dev = self.config.dev, "Pipeline assembled");

        let router = Router::new()
            .fallback(render_handler)
            .with_state(self.host.clone());
        request::layers(stage::assemble(router, stages))
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn run<F>(&self, listener: TcpListener, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.ready();
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn listen<F>(&self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.server.bind_address()).await?;
        let addr = listener.local_addr()?;
        tracing::info!("Server listening on http://{}", addr);
        self.run(listener, shutdown).await
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("dev", &self.config.dev)
            .field("stages", &self.stages)
            .field("compressor", &self.compressor)
            .field("ready", &self.router.get().is_some())
            .finish()
    }
}

async fn render_handler(State(host): State<Arc<Host>>, request: Request) -> Response {
    let start = Instant::now();
    let uri = request.uri().clone();
    match host.renderer.render(request).await {
        Ok(response) => response,
        Err(failure) => {
            let response = host.error_handler.handle(failure, &uri);
            metrics::record_request("none", response.status().as_u16(), start);
            response
        }
    }
}
