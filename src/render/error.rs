//! Per-request error taxonomy.

use std::fmt;

use axum::http::StatusCode;
use thiserror::Error;

use crate::component::{BoxError, ModuleLoadError};
use crate::routing::DecodeError;

/// Failure while producing markup.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RenderError {
    message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("state serialization failed: {}", e))
    }
}

impl From<fmt::Error> for RenderError {
    fn from(_: fmt::Error) -> Self {
        Self::new("formatting failed")
    }
}

/// Which data function failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRole {
    App,
    Page,
}

impl fmt::Display for DataRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataRole::App => f.write_str("app"),
            DataRole::Page => f.write_str("page"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RextError {
    #[error(transparent)]
    ModuleLoad(#[from] ModuleLoadError),

    #[error("{role} data function failed: {source}")]
    DataFetch {
        role: DataRole,
        #[source]
        source: BoxError,
    },

    #[error("malformed request URL: {0}")]
    Decode(#[from] DecodeError),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    #[error("no route for {path}")]
    NoRoute { path: String },
}

/// A per-request error on its way to the error handler, with the status it
/// was tagged with, if any.
#[derive(Debug)]
pub struct RequestFailure {
    pub error: RextError,
    pub status: Option<StatusCode>,
}

impl RequestFailure {
    pub fn untagged(error: RextError) -> Self {
        Self { error, status: None }
    }

    pub fn tagged(error: RextError, status: StatusCode) -> Self {
        Self {
            error,
            status: Some(status),
        }
    }
}

impl From<RextError> for RequestFailure {
    fn from(error: RextError) -> Self {
        match error {
            RextError::Decode(_) => Self::tagged(error, StatusCode::BAD_REQUEST),
            _ => Self::untagged(error),
        }
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({})", self.error, status),
            None => write!(f, "{}", self.error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_errors_are_tagged_bad_request() {
        let error = RextError::Decode(DecodeError::InvalidUtf8("%ff".into()));
        let failure = RequestFailure::from(error);
        assert_eq!(failure.status, Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_other_errors_stay_untagged() {
        let failure = RequestFailure::from(RextError::Render(RenderError::new("boom")));
        assert_eq!(failure.status, None);

        let failure = RequestFailure::from(RextError::DataFetch {
            role: DataRole::Page,
            source: "db down".into(),
        });
        assert_eq!(failure.status, None);
        assert_eq!(failure.to_string(), "page data function failed: db down");
    }
}
