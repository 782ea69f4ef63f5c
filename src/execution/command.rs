//! External benchmark program execution.

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

use crate::config::TaskConfig;
use crate::core::capability::{Capability, CapabilityError};

/// A capability that shells out to an external benchmark program.
///
/// The program is invoked once per configured artifact, as
/// `<program> --config <input> --out <artifact>`, with the artifact path
/// joined under the task's `output` directory when one is set. The program
/// owns the scenario schema and the artifact contents; nothing is parsed or
/// cleaned up here.
pub struct CommandCapability {
    program: PathBuf,
}

impl CommandCapability {
    /// Create a capability running the given program.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn artifact_path(&self, task: &TaskConfig, artifact: &str) -> PathBuf {
        match &task.options.output {
            Some(dir) => dir.join(artifact),
            None => PathBuf::from(artifact),
        }
    }

    fn run_once(&self, task: &TaskConfig, input: &Path, out: &Path) -> Result<(), CapabilityError> {
        if let Some(dir) = out.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir).map_err(|source| {
                CapabilityError::with_source(
                    format!("failed to create output directory '{}'", dir.display()),
                    source,
                )
            })?;
        }

        info!(
            "{}: {} -> {}",
            task.name,
            input.display(),
            out.display()
        );

        let output = Command::new(&self.program)
            .arg("--config")
            .arg(input)
            .arg("--out")
            .arg(out)
            .output()
            .map_err(|source| {
                CapabilityError::with_source(
                    format!("failed to launch '{}'", self.program.display()),
                    source,
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let detail = if stderr.is_empty() {
                String::new()
            } else {
                format!(": {stderr}")
            };
            return Err(CapabilityError::new(format!(
                "'{}' exited with {}{}",
                self.program.display(),
                output.status,
                detail
            )));
        }

        Ok(())
    }
}

impl Capability for CommandCapability {
    fn execute(&self, task: &TaskConfig) -> Result<(), CapabilityError> {
        for (artifact, input) in &task.files {
            let out = self.artifact_path(task, artifact);
            self.run_once(task, input, &out)?;
        }
        Ok(())
    }
}
