//! Compiled page modules.
//!
//! # Data Flow
//! ```text
//! entry name ("blog/_id", "_app", "_document")
//!     → loader.rs (resolve to <server dir>/<name>.<ext>)
//!     → cache hit?  (production only)
//!     → registry.rs (ModuleSource: linked registry, html fragments on disk)
//!     → LoadedModule { component, optional data fetch }
//! ```
//!
//! # Design Decisions
//! - Components are trait objects rendering to strings; no template language
//! - Head tags are collected through the render scope and returned, not
//!   stashed in process-wide state
//! - Cache policy is explicit configuration, not an eviction side effect

pub mod builtin;
pub mod loader;
pub mod registry;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::render::context::RenderContext;
use crate::render::document::DocumentProps;
use crate::render::error::RenderError;
use crate::render::head::Head;

pub use builtin::{DefaultApp, DefaultDocument, StaticFragment};
pub use loader::{CachePolicy, ComponentLoader};
pub use registry::{FragmentSource, ModuleExports, ModuleLoadError, ModuleRegistry, ModuleSource};

/// Module name of the document shell.
pub const DOCUMENT_MODULE: &str = "_document";

/// Module name of the app wrapper.
pub const APP_MODULE: &str = "_app";

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Whether output will be hydrated on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Hydratable,
    Static,
}

/// Everything a component can see while rendering.
pub struct RenderScope<'a> {
    mode: RenderMode,
    props: &'a Value,
    child: Option<&'a dyn Component>,
    document: Option<&'a DocumentProps>,
    head: &'a mut Head,
}

impl<'a> RenderScope<'a> {
    pub fn new(mode: RenderMode, props: &'a Value, head: &'a mut Head) -> Self {
        Self {
            mode,
            props,
            child: None,
            document: None,
            head,
        }
    }

    pub fn with_child(mut self, child: &'a dyn Component) -> Self {
        self.child = Some(child);
        self
    }

    pub fn with_document(mut self, document: &'a DocumentProps) -> Self {
        self.document = Some(document);
        self
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Page state, `null` when no data function produced any.
    pub fn props(&self) -> &Value {
        self.props
    }

    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// Document inputs. Only set while rendering the document.
    pub fn document(&self) -> Option<&DocumentProps> {
        self.document
    }

    pub fn head(&mut self) -> &mut Head {
        self.head
    }

    /// Render the wrapped page with the same props and head.
    pub fn render_child(&mut self) -> Result<String, RenderError> {
        let child = self
            .child
            .ok_or_else(|| RenderError::new("no child component to render"))?;
        let mut scope = RenderScope {
            mode: self.mode,
            props: self.props,
            child: None,
            document: None,
            head: &mut *self.head,
        };
        child.render(&mut scope)
    }
}

/// A server-renderable component.
pub trait Component: Send + Sync {
    fn render(&self, scope: &mut RenderScope<'_>) -> Result<String, RenderError>;
}

impl<F> Component for F
where
    F: Fn(&mut RenderScope<'_>) -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self, scope: &mut RenderScope<'_>) -> Result<String, RenderError> {
        self(scope)
    }
}

/// Wrap a render function as a shared component.
pub fn component<F>(f: F) -> Arc<dyn Component>
where
    F: Fn(&mut RenderScope<'_>) -> Result<String, RenderError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Optional async server-side data function of a module.
///
/// `Ok(None)` means the function produced nothing.
pub trait DataFetch: Send + Sync {
    fn fetch<'a>(&'a self, ctx: &'a RenderContext) -> BoxFuture<'a, Result<Option<Value>, BoxError>>;
}

struct FnFetch<F>(F);

impl<F, Fut> DataFetch for FnFetch<F>
where
    F: Fn(RenderContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Value>, BoxError>> + Send + 'static,
{
    fn fetch<'a>(&'a self, ctx: &'a RenderContext) -> BoxFuture<'a, Result<Option<Value>, BoxError>> {
        Box::pin((self.0)(ctx.clone()))
    }
}

/// Wrap an async function taking an owned context as a data function.
pub fn data_fetch<F, Fut>(f: F) -> Arc<dyn DataFetch>
where
    F: Fn(RenderContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<Value>, BoxError>> + Send + 'static,
{
    Arc::new(FnFetch(f))
}

/// A resolved module: its component and optional data function.
#[derive(Clone)]
pub struct LoadedModule {
    pub component: Arc<dyn Component>,
    pub data_fetch: Option<Arc<dyn DataFetch>>,
}

impl LoadedModule {
    pub fn new(component: Arc<dyn Component>) -> Self {
        Self {
            component,
            data_fetch: None,
        }
    }

    pub fn with_data_fetch(mut self, data_fetch: Arc<dyn DataFetch>) -> Self {
        self.data_fetch = Some(data_fetch);
        self
    }
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("data_fetch", &self.data_fetch.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_child_shares_props_and_head() {
        let page = component(|scope| {
            scope.head().set_title("Page");
            Ok(format!("<p>{}</p>", scope.prop("n").unwrap_or(&Value::Null)))
        });
        let app = component(|scope| Ok(format!("<main>{}</main>", scope.render_child()?)));

        let props = serde_json::json!({ "n": 3 });
        let mut head = Head::default();
        let mut scope =
            RenderScope::new(RenderMode::Hydratable, &props, &mut head).with_child(&*page);
        assert_eq!(app.render(&mut scope).unwrap(), "<main><p>3</p></main>");
        assert_eq!(head.title(), Some("Page"));
    }

    #[test]
    fn test_render_child_without_child_fails() {
        let props = Value::Null;
        let mut head = Head::default();
        let mut scope = RenderScope::new(RenderMode::Static, &props, &mut head);
        assert!(scope.render_child().is_err());
    }
}
