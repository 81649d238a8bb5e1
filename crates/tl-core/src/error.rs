//! Error types for tl-core

use thiserror::Error;

use crate::kind::CanonicalKind;

/// Core error type for configuration and I/O
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {0}")]
    ConfigParseError(#[from] serde_yaml::Error),

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: IO error with file path context
    #[error("[E004] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// A fragment of the tree that lacks the structure its kind promises.
///
/// These never abort an extraction. The engine logs them and keeps walking
/// the remaining siblings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedTree {
    /// A node is missing the child that carries its payload
    #[error("{parent} node has no {expected} child")]
    MissingChild {
        parent: CanonicalKind,
        expected: CanonicalKind,
    },

    /// A name-bearing node produced an empty qualified name
    #[error("{kind} node produced an empty name")]
    EmptyName { kind: CanonicalKind },
}
