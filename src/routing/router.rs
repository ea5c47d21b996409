//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes, one per manifest entry
//! - Look up matching route for a request path
//! - Return matched route, the catch-all, or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (swapped whole on manifest reload)
//! - O(1) lookup for fully static patterns via HashMap
//! - O(n) scan over dynamic patterns, first match in table order wins
//! - The catch-all is kept apart and consulted last

use std::collections::HashMap;

use crate::config::RouterConfig;
use crate::routing::matcher::{derive_pattern, RequestPath, RoutePattern};
use crate::routing::uri::DecodeError;

/// A manifest entry compiled into a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub name: String,
    pub pattern: RoutePattern,
}

impl RouteEntry {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let pattern = derive_pattern(&name);
        Self { name, pattern }
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Manifest entry name.
    pub entry: String,
    /// Named parameters extracted from dynamic segments.
    pub params: HashMap<String, String>,
}

/// Ordered route list with a static index and an optional catch-all.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    static_index: HashMap<Vec<String>, usize>,
    dynamic: Vec<usize>,
    fallback: Option<RouteEntry>,
    options: RouterConfig,
}

impl RouteTable {
    /// Build a table from manifest entry names, in manifest order.
    pub fn from_entries<I, S>(names: I, options: RouterConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self {
            options,
            ..Self::default()
        };

        for name in names {
            let entry = RouteEntry::new(name);
            match &entry.pattern {
                RoutePattern::CatchAll => {
                    if table.fallback.is_none() {
                        table.fallback = Some(entry);
                    }
                }
                RoutePattern::Path(pattern) => {
                    let index = table.entries.len();
                    match pattern.static_key(&options) {
                        Some(key) => {
                            table.static_index.entry(key).or_insert(index);
                        }
                        None => table.dynamic.push(index),
                    }
                    table.entries.push(entry);
                }
            }
        }

        table
    }

    /// Non-catch-all entries in evaluation order.
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn fallback(&self) -> Option<&RouteEntry> {
        self.fallback.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len() + usize::from(self.fallback.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a raw request path. `Ok(None)` means no route.
    pub fn match_path(&self, raw_path: &str) -> Result<Option<RouteMatch>, DecodeError> {
        let path = RequestPath::parse(raw_path, &self.options)?;
        let static_hit = self.static_index.get(&path.static_key(&self.options)).copied();

        for &index in &self.dynamic {
            if static_hit.is_some_and(|hit| index > hit) {
                break;
            }
            let entry = &self.entries[index];
            if let RoutePattern::Path(pattern) = &entry.pattern {
                if let Some(params) = pattern.matches(&path, &self.options) {
                    return Ok(Some(RouteMatch {
                        entry: entry.name.clone(),
                        params,
                    }));
                }
            }
        }

        if let Some(index) = static_hit {
            return Ok(Some(RouteMatch {
                entry: self.entries[index].name.clone(),
                params: HashMap::new(),
            }));
        }

        Ok(self.fallback.as_ref().map(|entry| RouteMatch {
            entry: entry.name.clone(),
            params: HashMap::new(),
        }))
    }
}
