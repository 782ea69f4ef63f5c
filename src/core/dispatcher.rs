//! Command alias dispatch.
//!
//! The dispatcher resolves an alias to its bound capability sequence and
//! invokes each capability synchronously, in order, with the task
//! configuration registered for its family. The first failure aborts the
//! sequence.

use std::fs::File;
use thiserror::Error;
use tracing::{error, info};

use crate::config::TaskConfig;
use crate::core::capability::{CapabilityError, CapabilitySet};
use crate::core::registry::Registry;

/// Errors that can occur while running a command alias.
#[derive(Debug, Error)]
pub enum RunError {
    /// The alias has no registered command.
    #[error("no command registered under alias '{0}'")]
    AliasNotFound(String),

    /// A bound capability has no task configuration registered for its
    /// family.
    #[error("no task configuration registered for capability '{0}'")]
    MissingTask(String),

    /// A bound capability is no longer present in the capability set.
    #[error("capability '{0}' is not loaded")]
    CapabilityNotLoaded(String),

    /// A capability invocation failed; later steps were not run.
    #[error("capability '{capability}' (step {step}) failed: {cause}")]
    CapabilityExecution {
        capability: String,
        step: usize,
        #[source]
        cause: CapabilityError,
    },
}

/// Dispatch lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No tasks or commands registered yet.
    Unloaded,
    /// Registrations accumulated, nothing run.
    Loaded,
    /// A run is in progress.
    Running,
    /// The last run succeeded.
    Completed,
    /// The last run failed.
    Failed,
}

/// Runs the capability sequence bound to a command alias.
///
/// Registries are read-only from here on; registration belongs to the load
/// phase.
pub struct Dispatcher<'a> {
    registry: &'a Registry,
    capabilities: &'a CapabilitySet,
    state: RunState,
}

impl<'a> Dispatcher<'a> {
    /// Create a dispatcher over a loaded registry and capability set.
    pub fn new(registry: &'a Registry, capabilities: &'a CapabilitySet) -> Self {
        let state = if registry.is_empty() {
            RunState::Unloaded
        } else {
            RunState::Loaded
        };
        Self {
            registry,
            capabilities,
            state,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run every capability bound to `alias`, in order, fail-fast.
    pub fn run(&mut self, alias: &str) -> Result<(), RunError> {
        self.state = RunState::Running;
        let result = self.dispatch(alias);
        self.state = match &result {
            Ok(()) => RunState::Completed,
            Err(_) => RunState::Failed,
        };
        result
    }

    fn dispatch(&self, alias: &str) -> Result<(), RunError> {
        let sequence = self
            .registry
            .command(alias)
            .ok_or_else(|| RunError::AliasNotFound(alias.to_string()))?;

        info!("Running '{}' ({} step(s))", alias, sequence.len());

        for (step, name) in sequence.iter().enumerate() {
            let task = self
                .registry
                .task(name)
                .ok_or_else(|| RunError::MissingTask(name.clone()))?;

            let capability = self
                .capabilities
                .get(name)
                .ok_or_else(|| RunError::CapabilityNotLoaded(name.clone()))?;

            // Input configs are checked per step rather than at load time:
            // an earlier step in the sequence may produce them.
            check_inputs(task).map_err(|cause| RunError::CapabilityExecution {
                capability: name.clone(),
                step,
                cause,
            })?;

            info!("Step {}: '{}' (target: {})", step + 1, name, task.name);
            capability
                .execute(task)
                .map_err(|cause| RunError::CapabilityExecution {
                    capability: name.clone(),
                    step,
                    cause,
                })
                .inspect_err(|e| error!("{e}"))?;
        }

        info!("'{}' completed", alias);
        Ok(())
    }
}

/// Verify that every input config a task references is readable.
fn check_inputs(task: &TaskConfig) -> Result<(), CapabilityError> {
    for input in task.files.values() {
        File::open(input).map_err(|source| {
            CapabilityError::with_source(
                format!("input config '{}' is not readable", input.display()),
                source,
            )
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ManifestLoader, TaskOptions};
    use crate::core::capability::Capability;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// Records every invocation; optionally fails.
    struct RecordingCapability {
        label: String,
        invocations: Arc<Mutex<Vec<String>>>,
        received: Arc<Mutex<Vec<TaskConfig>>>,
        fail: bool,
    }

    impl RecordingCapability {
        fn new(label: &str, invocations: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                label: label.to_string(),
                invocations,
                received: Arc::new(Mutex::new(Vec::new())),
                fail: false,
            }
        }

        fn failing(label: &str, invocations: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                fail: true,
                ..Self::new(label, invocations)
            }
        }
    }

    impl Capability for RecordingCapability {
        fn execute(&self, task: &TaskConfig) -> Result<(), CapabilityError> {
            self.invocations.lock().unwrap().push(self.label.clone());
            self.received.lock().unwrap().push(task.clone());
            if self.fail {
                Err(CapabilityError::new("boom"))
            } else {
                Ok(())
            }
        }
    }

    fn task(name: &str) -> TaskConfig {
        TaskConfig {
            name: name.to_string(),
            options: Default::default(),
            files: Default::default(),
        }
    }

    #[test]
    fn test_run_unregistered_alias_fails() {
        let registry = Registry::new();
        let capabilities = CapabilitySet::new();
        let mut dispatcher = Dispatcher::new(&registry, &capabilities);

        assert_eq!(dispatcher.state(), RunState::Unloaded);
        let result = dispatcher.run("benchmark");
        assert!(matches!(result, Err(RunError::AliasNotFound(alias)) if alias == "benchmark"));
        assert_eq!(dispatcher.state(), RunState::Failed);
    }

    #[test]
    fn test_run_invokes_capability_with_registered_config() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("config.json");
        std::fs::write(&input, "{}").unwrap();

        let mut files = BTreeMap::new();
        files.insert("report.html".to_string(), input.clone());
        files.insert("export.json".to_string(), input);
        let config = TaskConfig {
            name: "Nautilus".to_string(),
            options: TaskOptions {
                output: Some(PathBuf::from("output_folder")),
            },
            files,
        };

        let invocations = Arc::new(Mutex::new(Vec::new()));
        let capability = RecordingCapability::new("api_benchmark", invocations.clone());
        let received = capability.received.clone();

        let mut capabilities = CapabilitySet::new();
        capabilities.insert("api_benchmark", Box::new(capability));

        let mut registry = Registry::new();
        registry.register_task("api_benchmark", config.clone()).unwrap();
        registry
            .register_command("benchmark", vec!["api_benchmark".into()], &capabilities)
            .unwrap();

        let mut dispatcher = Dispatcher::new(&registry, &capabilities);
        assert_eq!(dispatcher.state(), RunState::Loaded);
        dispatcher.run("benchmark").unwrap();
        assert_eq!(dispatcher.state(), RunState::Completed);

        // Invoked exactly once, with the exact registered value.
        assert_eq!(invocations.lock().unwrap().len(), 1);
        let received = received.lock().unwrap();
        assert_eq!(received.as_slice(), [config]);
    }

    #[test]
    fn test_fail_fast_aborts_sequence() {
        let invocations = Arc::new(Mutex::new(Vec::new()));
        let mut capabilities = CapabilitySet::new();
        capabilities.insert(
            "c1",
            Box::new(RecordingCapability::failing("c1", invocations.clone())),
        );
        capabilities.insert(
            "c2",
            Box::new(RecordingCapability::new("c2", invocations.clone())),
        );

        let mut registry = Registry::new();
        registry.register_task("c1", task("first")).unwrap();
        registry.register_task("c2", task("second")).unwrap();
        registry
            .register_command("all", vec!["c1".into(), "c2".into()], &capabilities)
            .unwrap();

        let mut dispatcher = Dispatcher::new(&registry, &capabilities);
        let result = dispatcher.run("all");

        match result {
            Err(RunError::CapabilityExecution {
                capability, step, ..
            }) => {
                assert_eq!(capability, "c1");
                assert_eq!(step, 0);
            }
            other => panic!("expected CapabilityExecution, got {other:?}"),
        }
        // c2 was never invoked.
        assert_eq!(*invocations.lock().unwrap(), vec!["c1".to_string()]);
        assert_eq!(dispatcher.state(), RunState::Failed);
    }

    #[test]
    fn test_three_capabilities_run_in_order() {
        let invocations = Arc::new(Mutex::new(Vec::new()));
        let mut capabilities = CapabilitySet::new();
        let mut registry = Registry::new();
        for name in ["c1", "c2", "c3"] {
            capabilities.insert(
                name,
                Box::new(RecordingCapability::new(name, invocations.clone())),
            );
            registry.register_task(name, task(name)).unwrap();
        }
        registry
            .register_command(
                "all",
                vec!["c1".into(), "c2".into(), "c3".into()],
                &capabilities,
            )
            .unwrap();

        let mut dispatcher = Dispatcher::new(&registry, &capabilities);
        dispatcher.run("all").unwrap();

        assert_eq!(
            *invocations.lock().unwrap(),
            vec!["c1".to_string(), "c2".to_string(), "c3".to_string()]
        );
        assert_eq!(dispatcher.state(), RunState::Completed);
    }

    #[test]
    fn test_missing_task_config_for_bound_capability() {
        let invocations = Arc::new(Mutex::new(Vec::new()));
        let mut capabilities = CapabilitySet::new();
        capabilities.insert(
            "api_benchmark",
            Box::new(RecordingCapability::new("api_benchmark", invocations.clone())),
        );

        let mut registry = Registry::new();
        registry
            .register_command("benchmark", vec!["api_benchmark".into()], &capabilities)
            .unwrap();

        let mut dispatcher = Dispatcher::new(&registry, &capabilities);
        let result = dispatcher.run("benchmark");
        assert!(matches!(result, Err(RunError::MissingTask(name)) if name == "api_benchmark"));
        assert!(invocations.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_input_config_fails_before_invocation() {
        let invocations = Arc::new(Mutex::new(Vec::new()));
        let mut capabilities = CapabilitySet::new();
        capabilities.insert(
            "api_benchmark",
            Box::new(RecordingCapability::new("api_benchmark", invocations.clone())),
        );

        let mut files = BTreeMap::new();
        files.insert(
            "report.html".to_string(),
            PathBuf::from("/nonexistent/config.json"),
        );
        let config = TaskConfig {
            name: "Nautilus".to_string(),
            options: Default::default(),
            files,
        };

        let mut registry = Registry::new();
        registry.register_task("api_benchmark", config).unwrap();
        registry
            .register_command("benchmark", vec!["api_benchmark".into()], &capabilities)
            .unwrap();

        let mut dispatcher = Dispatcher::new(&registry, &capabilities);
        let result = dispatcher.run("benchmark");
        assert!(matches!(
            result,
            Err(RunError::CapabilityExecution { step: 0, .. })
        ));
        // The capability itself never ran.
        assert!(invocations.lock().unwrap().is_empty());
    }

    #[test]
    fn test_run_from_parsed_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("config.json");
        std::fs::write(&input, "{}").unwrap();

        let toml = format!(
            r#"
[commands]
benchmark = ["api_benchmark"]

[tasks.api_benchmark]
name = "Nautilus"

[tasks.api_benchmark.options]
output = "output_folder"

[tasks.api_benchmark.files]
"report.html" = {input:?}
"export.json" = {input:?}
"#,
            input = input.display().to_string()
        );
        let manifest = ManifestLoader::parse(&toml).unwrap();

        let invocations = Arc::new(Mutex::new(Vec::new()));
        let mut capabilities = CapabilitySet::new();
        capabilities.insert(
            "api_benchmark",
            Box::new(RecordingCapability::new("api_benchmark", invocations.clone())),
        );

        let mut registry = Registry::new();
        registry.load_manifest(manifest, &capabilities).unwrap();

        let mut dispatcher = Dispatcher::new(&registry, &capabilities);
        dispatcher.run("benchmark").unwrap();
        assert_eq!(invocations.lock().unwrap().len(), 1);
    }
}
