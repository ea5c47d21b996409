//! Request rendering pipeline.
//!
//! # Data Flow
//! ```text
//! Request
//!     → renderer.rs (decode URL, match route, classify assets)
//!     → context.rs (RenderContext, optional enrichment hook)
//!     → component loader (_document, _app, page)
//!     → data.rs (app data fn, page data fn, merge: app wins)
//!     → render app + page (hydratable) → fragment + head.rs tags
//!     → render document (static markup)
//!     → "<!doctype html>" + document
//!     → Response (200, text/html, Accept-Ranges: none, Content-Length)
//!
//! Any failure → error.rs (RequestFailure, 400 for bad URLs) → host error handler
//! ```
//!
//! # Design Decisions
//! - Head tags are part of the app render's return value
//! - No suspension point between app render and document render
//! - Data functions may set status and headers; the mandatory headers win

pub mod context;
pub mod data;
pub mod document;
pub mod error;
pub mod head;
pub mod markup;
pub mod renderer;

pub use context::{ContextHook, RenderContext, ResponseHead};
pub use data::{fetch_state, merge_state};
pub use document::DocumentProps;
pub use error::{DataRole, RenderError, RequestFailure, RextError};
pub use head::{Head, HeadTags};
pub use renderer::{render_app, render_document, AppRender, Renderer};
