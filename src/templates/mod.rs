//! templates
//!
//! Prompt templates: loading, merging and interpolation.
//!
//! # Architecture
//!
//! - [`store`] finds templates by name in the user template directory, or
//!   by filesystem path
//! - [`template`] parses one template file
//! - [`merge`] folds fragment templates into a primary template
//! - [`interpolate`] substitutes `{{name}}` placeholders
//!
//! Loaded templates are never mutated. Merging and rendering produce new
//! values.

pub mod interpolate;
pub mod merge;
pub mod store;
pub mod template;

use std::path::PathBuf;

use thiserror::Error;

pub use interpolate::{interpolate, Bindings};
pub use merge::{merge, MergedTemplate, RenderedTemplate};
pub use store::TemplateStore;
pub use template::{Template, TemplateSource};

/// Errors from template operations.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template exists for a reference.
    #[error("template not found: '{0}'")]
    NotFound(String),

    /// Placeholders left without a binding.
    #[error("missing template variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),

    /// Template content could not be parsed.
    #[error("invalid template '{name}': {message}")]
    Invalid { name: String, message: String },

    /// A `{{> slot}}` no fragment filled.
    #[error("template slot '{0}' was not filled by any fragment")]
    UnfilledSlot(String),

    #[error("template already exists: {0} (use --force to replace it)")]
    AlreadyExists(PathBuf),

    #[error("invalid template name '{0}': use letters, digits, '-', '_' or '.'")]
    InvalidName(String),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PartialEq for TemplateError {
    fn eq(&self, other: &Self) -> bool {
        use TemplateError::*;
        match (self, other) {
            (NotFound(a), NotFound(b)) => a == b,
            (MissingVariables(a), MissingVariables(b)) => a == b,
            (
                Invalid {
                    name: n1,
                    message: m1,
                },
                Invalid {
                    name: n2,
                    message: m2,
                },
            ) => n1 == n2 && m1 == m2,
            (UnfilledSlot(a), UnfilledSlot(b)) => a == b,
            (AlreadyExists(a), AlreadyExists(b)) => a == b,
            (InvalidName(a), InvalidName(b)) => a == b,
            (
                Io {
                    path: p1,
                    source: s1,
                },
                Io {
                    path: p2,
                    source: s2,
                },
            ) => p1 == p2 && s1.kind() == s2.kind(),
            _ => false,
        }
    }
}
