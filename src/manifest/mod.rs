//! Resource manifest subsystem.
//!
//! # Data Flow
//! ```text
//! resources.json (disk in production, in-memory fs in development)
//!     → fs.rs (ManifestReader: exists / read_to_string)
//!     → loader.rs (parse, keep key order)
//!     → Routing { manifest, route table }
//!     → atomic swap of Arc<Routing>
//!     → renderer observes new routes on its next request
//!
//! In development:
//!     build pushes DevUpdate::Filesystem, or
//!     watcher.rs detects the file changed on disk
//!     → loader.rs reloads
//! ```
//!
//! # Design Decisions
//! - Load failures never reach the caller: empty manifest, warning logged
//! - Manifest and route table are replaced together, never edited in place

pub mod fs;
pub mod loader;
pub mod watcher;

pub use fs::{DiskFs, ManifestReader, MemoryFs};
pub use loader::{Assets, ManifestLoadError, ManifestLoader, ResourceManifest, Routing};
pub use watcher::ManifestWatcher;
