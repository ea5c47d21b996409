//! rext: server-side rendering request pipeline.
//!
//! Resolves a request path to a pre-compiled page, gathers its server-side
//! data, renders a complete HTML document and writes the response.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                      REXT                        │
//!                      │                                                  │
//!   Client Request     │  ┌─────────┐   ┌──────────────────────────┐     │
//!   ───────────────────┼─▶│  http   │──▶│ stages: dev / compress / │     │
//!                      │  │ server  │   │ static / user stages     │     │
//!                      │  └─────────┘   └────────────┬─────────────┘     │
//!                      │                             ▼                    │
//!                      │  ┌──────────┐   ┌──────────────────┐            │
//!                      │  │ manifest │──▶│     routing      │            │
//!                      │  │  loader  │   │ (route table)    │            │
//!                      │  └──────────┘   └────────┬─────────┘            │
//!                      │                          ▼                      │
//!                      │  ┌──────────┐   ┌──────────────────┐            │
//!                      │  │component │──▶│      render      │            │
//!                      │  │ loader   │   │ data → app → doc │            │
//!                      │  └──────────┘   └────────┬─────────┘            │
//!   Client Response    │                          │                      │
//!   ◀──────────────────┼──────────────────────────┘                      │
//!                      │                                                  │
//!                      │  config · lifecycle · observability              │
//!                      └──────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod component;
pub mod config;
pub mod http;
pub mod manifest;
pub mod render;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use component::{CachePolicy, Component, ComponentLoader, ModuleExports, ModuleRegistry};
pub use config::RextConfig;
pub use http::{Server, ServerBuilder, Stage};
pub use lifecycle::Shutdown;
pub use render::{RenderContext, RequestFailure, RextError};
