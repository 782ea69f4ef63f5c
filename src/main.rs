//! crank - a minimal declarative benchmark task runner.
//!
//! Usage:
//!   crank run [ALIAS]      Run the capabilities bound to a command alias
//!   crank validate         Validate the task manifest without running
//!   crank list             List registered tasks and command aliases

mod cli_config;

use clap::{Parser, Subcommand};
use cli_config::{Config, DEFAULT_FAMILY};
use crank::{CapabilitySet, CommandCapability, Dispatcher, ManifestLoader, Registry};
use std::path::PathBuf;
use tracing::{error, info};

/// crank - a minimal declarative benchmark task runner
#[derive(Parser)]
#[command(name = "crank")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (overrides XDG default)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the task manifest (overrides config file)
    #[arg(short, long, global = true)]
    manifest: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the capabilities bound to a command alias
    Run {
        /// Command alias to run
        #[arg(value_name = "ALIAS", default_value = "benchmark")]
        alias: String,
    },

    /// Validate the task manifest without running
    Validate,

    /// List registered tasks and command aliases
    List,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration from file (explicit or XDG default)
    let file_config = match Config::load(cli.config.clone()) {
        Ok(config) => {
            if let Some(path) = &cli.config {
                info!("Loaded configuration from: {}", path.display());
            } else if let Some(default_path) = Config::default_config_path()
                && default_path.exists()
            {
                info!("Loaded configuration from: {}", default_path.display());
            }
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // CLI manifest path takes priority over the config file.
    let manifest_path = cli
        .manifest
        .unwrap_or_else(|| file_config.runner.manifest.clone());

    match cli.command {
        Commands::Run { alias } => {
            run_alias(&manifest_path, &alias, &file_config)?;
        }
        Commands::Validate => {
            validate_manifest(&manifest_path)?;
        }
        Commands::List => {
            list_manifest(&manifest_path, &file_config)?;
        }
    }

    Ok(())
}

/// Build the capability set: the stock `api_benchmark` family plus any extra
/// families named in the config file, each backed by an external program.
fn build_capabilities(config: &Config) -> CapabilitySet {
    let mut capabilities = CapabilitySet::new();
    capabilities.insert(
        DEFAULT_FAMILY,
        Box::new(CommandCapability::new(config.program_for(DEFAULT_FAMILY))),
    );
    for family in config.programs.keys() {
        if family != DEFAULT_FAMILY {
            capabilities.insert(
                family.clone(),
                Box::new(CommandCapability::new(config.program_for(family))),
            );
        }
    }
    capabilities
}

/// Load the manifest and run one command alias.
fn run_alias(
    manifest_path: &PathBuf,
    alias: &str,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Loading manifest from: {}", manifest_path.display());
    let manifest = ManifestLoader::load(manifest_path)?;

    let capabilities = build_capabilities(config);
    let mut registry = Registry::new();
    registry.load_manifest(manifest, &capabilities)?;

    let mut dispatcher = Dispatcher::new(&registry, &capabilities);
    dispatcher.run(alias)?;

    info!("Done!");
    Ok(())
}

/// Validate the manifest without running anything.
fn validate_manifest(manifest_path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    info!("Validating manifest: {}", manifest_path.display());

    match ManifestLoader::load(manifest_path) {
        Ok(manifest) => {
            info!(
                "Manifest is valid: {} task(s), {} command(s)",
                manifest.tasks.len(),
                manifest.commands.len()
            );
            Ok(())
        }
        Err(e) => {
            error!("Validation failed: {}", e);
            Err(e.into())
        }
    }
}

/// List tasks and command aliases in the manifest.
fn list_manifest(
    manifest_path: &PathBuf,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let manifest = ManifestLoader::load(manifest_path)?;

    if manifest.tasks.is_empty() && manifest.commands.is_empty() {
        println!("No tasks or commands in {}", manifest_path.display());
        return Ok(());
    }

    println!("Tasks in {}:", manifest_path.display());
    println!();

    for (family, task) in &manifest.tasks {
        println!("{}: {}", family, task.name);
        if let Some(output) = &task.options.output {
            println!("  Output: {}", output.display());
        }
        for (artifact, input) in &task.files {
            println!("  {} <- {}", artifact, input.display());
        }
        println!();
    }

    println!("Commands:");
    let capabilities = build_capabilities(config);
    for (alias, sequence) in &manifest.commands {
        let steps: Vec<&str> = sequence.iter().map(|s| s.as_str()).collect();
        let missing: Vec<&str> = sequence
            .iter()
            .map(|s| s.as_str())
            .filter(|s| !capabilities.contains(s))
            .collect();
        if missing.is_empty() {
            println!("  {} -> [{}]", alias, steps.join(", "));
        } else {
            println!(
                "  {} -> [{}] (not loaded: {})",
                alias,
                steps.join(", "),
                missing.join(", ")
            );
        }
    }

    Ok(())
}
