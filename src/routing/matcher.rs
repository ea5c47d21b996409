//! Route derivation and path pattern matching.
//!
//! # Responsibilities
//! - Derive a URL pattern from a manifest entry name
//! - Compile patterns into segment lists
//! - Match decoded request segments, extracting named parameters
//!
//! # Design Decisions
//! - Derivation is pure: same entry name always yields the same pattern
//! - Full-path matching only (segment counts must agree)
//! - Static segments compare case-insensitively unless configured otherwise
//! - No regex to guarantee O(n) matching

use std::collections::HashMap;
use std::fmt;

use crate::config::RouterConfig;
use crate::routing::uri::{decode_component, DecodeError};

/// Reserved entry name that matches every otherwise-unmatched path.
pub const CATCH_ALL_ENTRY: &str = "_error";

/// Derive the pattern source for a manifest entry name.
///
/// `_error` → catch-all, `index` / `a/index` → `/` / `/a`,
/// `blog/_id` → `/blog/:id`.
pub fn derive_pattern(entry: &str) -> RoutePattern {
    if entry == CATCH_ALL_ENTRY {
        return RoutePattern::CatchAll;
    }

    let trimmed = entry.trim_matches('/');
    let trimmed = if trimmed == "index" {
        ""
    } else {
        trimmed.strip_suffix("/index").unwrap_or(trimmed)
    };

    let segments = if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed
            .split('/')
            .map(|segment| match segment.strip_prefix('_') {
                Some(name) if !name.is_empty() => Segment::Param(name.to_string()),
                _ => Segment::Static(segment.to_string()),
            })
            .collect()
    };

    RoutePattern::Path(PathPattern { segments })
}

/// Compiled URL pattern of one route entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    CatchAll,
    Path(PathPattern),
}

impl RoutePattern {
    pub fn is_catch_all(&self) -> bool {
        matches!(self, RoutePattern::CatchAll)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutePattern::CatchAll => write!(f, "(.*)"),
            RoutePattern::Path(pattern) => write!(f, "{}", pattern),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Static(String),
    Param(String),
}

/// A slash-separated pattern such as `/blog/:id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True when the pattern has no dynamic segments.
    pub fn is_static(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Static(_)))
    }

    /// Lookup key of a static pattern, normalized for the router options.
    pub fn static_key(&self, options: &RouterConfig) -> Option<Vec<String>> {
        if !self.is_static() {
            return None;
        }
        let parts: Vec<&str> = self
            .segments
            .iter()
            .filter_map(|s| match s {
                Segment::Static(value) => Some(value.as_str()),
                Segment::Param(_) => None,
            })
            .collect();
        Some(normalize_key(&parts, options))
    }

    /// Match decoded request segments. Returns the extracted parameters.
    pub fn matches(
        &self,
        path: &RequestPath,
        options: &RouterConfig,
    ) -> Option<HashMap<String, String>> {
        if path.segments.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (pattern, actual) in self.segments.iter().zip(&path.segments) {
            match pattern {
                Segment::Static(expected) => {
                    let equal = if options.case_sensitive {
                        expected == actual
                    } else {
                        expected.eq_ignore_ascii_case(actual)
                    };
                    if !equal {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if actual.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), actual.clone());
                }
            }
        }
        Some(params)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            match segment {
                Segment::Static(value) => write!(f, "/{}", value)?,
                Segment::Param(name) => write!(f, "/:{}", name)?,
            }
        }
        Ok(())
    }
}

/// A request path split into decoded segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    segments: Vec<String>,
}

impl RequestPath {
    /// Split a raw (still encoded) path. Without `strict`, one trailing
    /// slash is ignored.
    pub fn parse(raw: &str, options: &RouterConfig) -> Result<Self, DecodeError> {
        let rest = raw.strip_prefix('/').unwrap_or(raw);
        let rest = if options.strict {
            rest
        } else {
            rest.strip_suffix('/').unwrap_or(rest)
        };

        let segments = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/')
                .map(decode_component)
                .collect::<Result<_, _>>()?
        };
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Segment-wise key, so a decoded `%2F` never lines up with a real
    /// segment boundary.
    pub fn static_key(&self, options: &RouterConfig) -> Vec<String> {
        let parts: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        normalize_key(&parts, options)
    }
}

fn normalize_key(parts: &[&str], options: &RouterConfig) -> Vec<String> {
    parts
        .iter()
        .map(|part| {
            if options.case_sensitive {
                part.to_string()
            } else {
                part.to_ascii_lowercase()
            }
        })
        .collect()
}
