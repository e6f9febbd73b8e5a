//! Error types for generation, configuration and tuning.
//!
//! Cycles and dangling references are not errors here; they surface as
//! [`menumaze_logic::solvability::Issue`]s.

use std::path::PathBuf;
use thiserror::Error;

/// Why a collapsed grid was rejected as a menu graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("graph has no nodes")]
    Empty,

    #[error("graph has {found} nodes, need at least 3")]
    TooFewNodes { found: usize },

    #[error("graph is split into {components} components")]
    Disconnected { components: usize },

    #[error("critical path has {found} nodes, need at least {required}")]
    CriticalPathTooShort { found: usize, required: usize },

    #[error("graph covers {found} categories, need at least {required}")]
    TooFewCategories { found: usize, required: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("generation failed after {attempts} attempts: {failure}")]
    StructuralValidation {
        attempts: usize,
        failure: ValidationFailure,
    },

    #[error("missing configuration: {what}")]
    ConfigurationMissing { what: String },

    #[error("invalid configuration in {file}: {source}")]
    ConfigurationInvalid {
        file: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown difficulty preset: {0}")]
    UnknownPreset(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
