//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → Server stops accepting → in-flight renders finish → exit
//! ```
//!
//! # Design Decisions
//! - One coordinator, cloned into every task that needs it
//! - Startup lives on the server (`Server::ready`), guarded to run once

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
