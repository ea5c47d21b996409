//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ports, non-empty names)
//! - Check that client globals are usable identifiers
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RextConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::RextConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("`{field}` must not be empty")]
    Empty { field: &'static str },

    #[error("`server.port` must not be 0")]
    ZeroPort,

    #[error("`{field}` = {value:?} is not a valid identifier")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("`build.dir.static` and `build.dir.server` both point to {0:?}")]
    SharedOutputDir(String),
}

/// Check a parsed configuration, collecting every problem.
pub fn validate_config(config: &RextConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let required = [
        ("dir.build", &config.dir.build),
        ("build.manifest", &config.build.manifest),
        ("build.dir.static", &config.build.dir.static_dir),
        ("build.dir.server", &config.build.dir.server),
        ("server.host", &config.server.host),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.push(ValidationError::Empty { field });
        }
    }

    if config.server.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    for (field, value) in [
        ("globals.context", &config.globals.context),
        ("globals.id", &config.globals.id),
    ] {
        if !is_identifier(value) {
            errors.push(ValidationError::InvalidIdentifier {
                field,
                value: value.clone(),
            });
        }
    }

    if !config.build.dir.static_dir.is_empty()
        && config.build.dir.static_dir == config.build.dir.server
    {
        errors.push(ValidationError::SharedOutputDir(config.build.dir.server.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
