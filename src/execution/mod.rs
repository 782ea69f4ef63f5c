//! Capability execution.
//!
//! This module provides the built-in capability implementation that hands a
//! task configuration to an external benchmark program.

mod command;

pub use command::CommandCapability;
