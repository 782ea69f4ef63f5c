//! Task manifest parsing and validation.
//!
//! A manifest is a TOML file with two tables: `[commands]`, mapping a command
//! alias to the ordered list of capability names it runs, and `[tasks]`,
//! keyed by capability family name, each entry describing one benchmark run
//! request.
//!
//! ```toml
//! [commands]
//! benchmark = ["api_benchmark"]
//!
//! [tasks.api_benchmark]
//! name = "Nautilus"
//!
//! [tasks.api_benchmark.options]
//! output = "output_folder"
//!
//! [tasks.api_benchmark.files]
//! "report.html" = "config.json"
//! "export.json" = "config.json"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::error::ConfigError;

/// Configuration for one benchmark run request.
///
/// Immutable once loaded; it is read-only input to the capability that
/// consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Benchmark target name (e.g. a project or service name).
    pub name: String,

    /// Run options.
    #[serde(default)]
    pub options: TaskOptions,

    /// Output artifact path to input config path.
    ///
    /// The input config files define the benchmark scenarios; their schema
    /// belongs to the capability and is never read here.
    #[serde(default)]
    pub files: BTreeMap<String, PathBuf>,
}

/// Recognized run options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskOptions {
    /// Destination directory for generated artifacts.
    pub output: Option<PathBuf>,
}

/// A parsed task manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Command alias to ordered capability names.
    #[serde(default)]
    pub commands: BTreeMap<String, Vec<String>>,

    /// Task configurations keyed by capability family name.
    #[serde(default)]
    pub tasks: BTreeMap<String, TaskConfig>,
}

/// Manifest loader.
pub struct ManifestLoader;

impl ManifestLoader {
    /// Load and validate a manifest from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Manifest, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadError {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str::<Manifest>(&content)
            .map_err(|source| ConfigError::TomlFileError {
                path: path.to_path_buf(),
                source,
            })
            .and_then(|manifest| {
                Self::validate(&manifest)?;
                Ok(manifest)
            })
    }

    /// Parse and validate a manifest from a TOML string.
    pub fn parse(content: &str) -> Result<Manifest, ConfigError> {
        let manifest: Manifest = toml::from_str(content)?;
        Self::validate(&manifest)?;
        Ok(manifest)
    }

    /// Validate a manifest.
    fn validate(manifest: &Manifest) -> Result<(), ConfigError> {
        for (family, task) in &manifest.tasks {
            if family.is_empty() {
                return Err(ConfigError::InvalidManifest(
                    "task key (capability family) cannot be empty".into(),
                ));
            }

            if task.name.is_empty() {
                return Err(ConfigError::MissingField(format!("tasks.{family}.name")));
            }

            for (artifact, input) in &task.files {
                if artifact.is_empty() {
                    return Err(ConfigError::InvalidManifest(format!(
                        "task '{family}' has an empty output artifact path"
                    )));
                }
                if input.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidManifest(format!(
                        "task '{family}' maps '{artifact}' to an empty input path"
                    )));
                }
            }
        }

        for (alias, capabilities) in &manifest.commands {
            if alias.is_empty() {
                return Err(ConfigError::InvalidManifest(
                    "command alias cannot be empty".into(),
                ));
            }

            if capabilities.is_empty() {
                return Err(ConfigError::InvalidManifest(format!(
                    "command '{alias}' must bind at least one capability"
                )));
            }

            for capability in capabilities {
                if capability.is_empty() {
                    return Err(ConfigError::InvalidManifest(format!(
                        "command '{alias}' binds an empty capability name"
                    )));
                }
            }
        }

        Ok(())
    }
}
