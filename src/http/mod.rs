//! HTTP pipeline host.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (request id, trace span)
//!     → stages, in order:
//!         dev:  dev.rs passthrough (hot-reload handler if registered)
//!         prod: compression.rs, static_files.rs (unless assets are external)
//!         user stages, in the order supplied
//!     → server.rs render handler → Renderer
//!     → on failure: response.rs (ErrorHandler)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - Stages are `Stage::Global` or `Stage::Scoped`; scoping never rewrites the URI
//! - Any stage may answer early; the renderer always answers
//! - Startup runs once per server, however often `ready` is called

pub mod compression;
pub mod dev;
pub mod request;
pub mod response;
pub mod server;
pub mod stage;
pub mod static_files;

pub use compression::Compressor;
pub use dev::{DevReceiver, DevSender, DevUpdate};
pub use request::X_REQUEST_ID;
pub use response::{DefaultErrorHandler, ErrorHandler};
pub use server::{default_modules, Server, ServerBuilder};
pub use stage::{handler, Handler, Stage};
