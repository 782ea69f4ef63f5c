//! CLI configuration file support.
//!
//! This module provides support for loading configuration from TOML files.
//! Configuration can be loaded from:
//! 1. An explicit path specified via --config flag
//! 2. The XDG config directory (~/.config/crank/config.toml)
//! 3. Fall back to defaults

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// The capability family the default `benchmark` command dispatches to.
pub const DEFAULT_FAMILY: &str = "api_benchmark";

fn default_manifest() -> PathBuf {
    PathBuf::from("crank.toml")
}

fn default_program() -> PathBuf {
    PathBuf::from("api-benchmark")
}

/// Runner configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunnerConfig {
    /// Default task manifest path (default: crank.toml).
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
        }
    }
}

/// Top-level configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Runner configuration.
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Benchmark program per capability family. Families listed here are
    /// loaded as capabilities in addition to the default `api_benchmark`.
    #[serde(default)]
    pub programs: HashMap<String, PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Get the default XDG config path (~/.config/crank/config.toml).
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("crank");
            path.push("config.toml");
            path
        })
    }

    /// Load configuration with priority:
    /// 1. Explicit config path if provided
    /// 2. XDG config path if it exists
    /// 3. Default configuration
    pub fn load(explicit_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Try explicit path first
        if let Some(path) = explicit_path {
            return Self::from_file(&path);
        }

        // Try XDG default path
        if let Some(path) = Self::default_config_path()
            && path.exists()
        {
            return Self::from_file(&path);
        }

        // Fall back to defaults
        Ok(Self::default())
    }

    /// The program configured for a capability family, or the stock
    /// `api-benchmark` binary.
    pub fn program_for(&self, family: &str) -> PathBuf {
        self.programs
            .get(family)
            .cloned()
            .unwrap_or_else(default_program)
    }
}
