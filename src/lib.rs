//! crank - a minimal declarative benchmark task runner.
//!
//! crank reads a TOML manifest describing named benchmark tasks and command
//! aliases, registers them in an explicit [`Registry`], and dispatches an
//! alias by invoking each bound [`Capability`] in order with its task
//! configuration. The benchmarking engine itself is an external program; the
//! built-in [`CommandCapability`] hands each task's input config and output
//! artifact paths to it and reports success or failure.

pub mod config;
pub mod core;
pub mod execution;

pub use crate::config::{ConfigError, Manifest, ManifestLoader, TaskConfig, TaskOptions};
pub use crate::core::capability::{Capability, CapabilityError, CapabilitySet};
pub use crate::core::dispatcher::{Dispatcher, RunError, RunState};
pub use crate::core::registry::{Registry, RegistryError};
pub use crate::execution::CommandCapability;
