//! Manifest loading and parsing.
//!
//! This module provides TOML-based loading of task manifests: the command
//! aliases and benchmark task configurations a run dispatches from.

mod error;
mod manifest;

pub use error::ConfigError;
pub use manifest::{Manifest, ManifestLoader, TaskConfig, TaskOptions};
