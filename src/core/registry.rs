//! Task and command registries.
//!
//! A [`Registry`] is an explicit, process-scoped value holding the task
//! configurations and command aliases accumulated during the load phase. It
//! is never a hidden singleton; tests construct an isolated registry per
//! case.

use std::collections::HashMap;
use thiserror::Error;

use crate::config::{Manifest, TaskConfig};
use crate::core::capability::CapabilitySet;

/// Errors that can occur during registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A task was registered twice under the same family name.
    #[error("task '{0}' is already registered")]
    DuplicateTask(String),

    /// A command alias was registered twice.
    #[error("command '{0}' is already registered")]
    DuplicateAlias(String),

    /// A command binds a capability that is not loaded.
    #[error("command '{alias}' binds unknown capability '{capability}'")]
    UnknownCapability { alias: String, capability: String },
}

/// Process-scoped storage of registered tasks and command aliases.
#[derive(Debug, Default)]
pub struct Registry {
    tasks: HashMap<String, TaskConfig>,
    commands: HashMap<String, Vec<String>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.commands.is_empty()
    }

    /// Register a task configuration under a capability family name.
    pub fn register_task(
        &mut self,
        family: impl Into<String>,
        config: TaskConfig,
    ) -> Result<(), RegistryError> {
        let family = family.into();
        if self.tasks.contains_key(&family) {
            return Err(RegistryError::DuplicateTask(family));
        }
        self.tasks.insert(family, config);
        Ok(())
    }

    /// Bind a command alias to an ordered sequence of capability names.
    ///
    /// Every name in the sequence must refer to a loaded capability.
    pub fn register_command(
        &mut self,
        alias: impl Into<String>,
        capabilities: Vec<String>,
        loaded: &CapabilitySet,
    ) -> Result<(), RegistryError> {
        let alias = alias.into();
        if self.commands.contains_key(&alias) {
            return Err(RegistryError::DuplicateAlias(alias));
        }

        for capability in &capabilities {
            if !loaded.contains(capability) {
                return Err(RegistryError::UnknownCapability {
                    alias,
                    capability: capability.clone(),
                });
            }
        }

        self.commands.insert(alias, capabilities);
        Ok(())
    }

    /// Register everything a manifest declares: tasks first, then commands.
    pub fn load_manifest(
        &mut self,
        manifest: Manifest,
        loaded: &CapabilitySet,
    ) -> Result<(), RegistryError> {
        for (family, config) in manifest.tasks {
            self.register_task(family, config)?;
        }
        for (alias, capabilities) in manifest.commands {
            self.register_command(alias, capabilities, loaded)?;
        }
        Ok(())
    }

    /// Look up the task configuration for a capability family.
    pub fn task(&self, family: &str) -> Option<&TaskConfig> {
        self.tasks.get(family)
    }

    /// Look up the capability sequence bound to an alias.
    pub fn command(&self, alias: &str) -> Option<&[String]> {
        self.commands.get(alias).map(|c| c.as_slice())
    }

    /// Iterate over registered tasks.
    pub fn tasks(&self) -> impl Iterator<Item = (&str, &TaskConfig)> {
        self.tasks.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over registered command aliases.
    pub fn commands(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.commands.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}
