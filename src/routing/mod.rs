//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (raw path, query)
//!     → uri.rs (strict decode, query parsing)
//!     → router.rs (route lookup)
//!     → matcher.rs (evaluate segment patterns)
//!     → Return: RouteMatch, catch-all, or NoMatch
//!
//! Route Compilation (on every manifest load):
//!     manifest entry names
//!     → derive patterns (`blog/_id` → `/blog/:id`)
//!     → index static patterns, keep dynamic ones ordered
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled on manifest load, immutable until the next load
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - First match wins (manifest order), catch-all last

pub mod matcher;
pub mod router;
pub mod uri;

pub use matcher::{derive_pattern, RoutePattern, CATCH_ALL_ENTRY};
pub use router::{RouteEntry, RouteMatch, RouteTable};
pub use uri::{decode_uri, parse_query, DecodeError};
