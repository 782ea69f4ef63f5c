//! Configuration error types.
//!
//! This module defines error types for manifest loading and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading a task manifest.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a manifest file.
    #[error("failed to read manifest '{path}': {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Failed to parse TOML from a specific file.
    #[error("TOML parse error in '{path}': {source}")]
    TomlFileError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Invalid manifest value.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// Missing required field.
    #[error("missing required field: {0}")]
    MissingField(String),
}
