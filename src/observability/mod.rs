//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! manifest, component, render, http:
//!     → tracing macros (structured fields)
//!     → logging.rs (fmt subscriber, EnvFilter)
//!
//!     → metrics.rs (counters, gauge, histogram)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ids are attached by tower-http and show up in the trace spans
//! - Metrics calls are cheap no-ops when the exporter is disabled

pub mod logging;
pub mod metrics;
