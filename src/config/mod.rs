//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! rext.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RextConfig (validated, immutable)
//!     → shared via Arc to the server, loader and renderer
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the manifest is what reloads, not config
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CompressionOptions, CompressorConfig, GlobalsConfig, ObservabilityConfig, RextConfig,
    RouterConfig, ServerConfig,
};
