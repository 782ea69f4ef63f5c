//! Capability interface.
//!
//! A capability is a pluggable unit of work invoked by name with a task
//! configuration. Implementations are registered explicitly in a
//! [`CapabilitySet`]; there is no dynamic loading.

use std::collections::HashMap;
use std::fmt;

use crate::config::TaskConfig;

/// Failure reported by a capability invocation.
///
/// The underlying cause is opaque to the dispatcher, which only attaches the
/// failing step before propagating it.
#[derive(Debug)]
pub struct CapabilityError {
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CapabilityError {
    /// Create an error from a message alone.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}", self.message, source),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for CapabilityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// A unit of work invoked with a task configuration.
pub trait Capability {
    /// Execute this capability against one task configuration.
    fn execute(&self, task: &TaskConfig) -> Result<(), CapabilityError>;
}

/// Explicit name-to-implementation mapping of loaded capabilities.
#[derive(Default)]
pub struct CapabilitySet {
    capabilities: HashMap<String, Box<dyn Capability>>,
}

impl CapabilitySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability under a name, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, capability: Box<dyn Capability>) {
        self.capabilities.insert(name.into(), capability);
    }

    /// Whether a capability is loaded under this name.
    pub fn contains(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    /// Look up a capability by name.
    pub fn get(&self, name: &str) -> Option<&dyn Capability> {
        self.capabilities.get(name).map(|c| c.as_ref())
    }

    /// Names of all loaded capabilities, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.capabilities.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}
