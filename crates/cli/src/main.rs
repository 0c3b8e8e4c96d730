//! Strata CLI
//!
//! Drives the layout engine from scripted scenarios and inspects
//! configuration files.

mod config;
mod scenario;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use strata_core_layout::{Config, LayoutEngine};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::scenario::Scenario;

#[derive(Parser)]
#[command(name = "strata")]
#[command(author, version, about = "Run and inspect the Strata scrollable tiling layout")]
struct Cli {
    /// Configuration file (defaults to the standard locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a JSON scenario and print the result of every step
    Run {
        /// Scenario file
        scenario: PathBuf,
        /// Print single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate the configuration and print any warnings
    Check,
    /// Print the effective configuration as TOML
    Dump,
    /// List the locations searched for a configuration file
    Paths,
}

/// Map a configured level name onto a filter directive.
fn level_directive(level: &str) -> &'static str {
    match level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(level: &str) -> Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
        _ => EnvFilter::new(level_directive(level)),
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for log level)
    let loaded = config::load(cli.config.as_deref());
    let level = match (&cli.log_level, &loaded) {
        (Some(level), _) => level.clone(),
        (None, Ok((config, _))) => config.behavior.log_level.clone(),
        (None, Err(_)) => "info".to_string(),
    };
    init_logging(&level)?;

    let (mut config, source) = loaded?;
    let warnings = config.validate();
    for w in &warnings {
        warn!("Config: {} - {}", w.field, w.message);
    }
    match &source {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("Using default configuration"),
    }

    match cli.command {
        Commands::Run { scenario, compact } => run_scenario(config, &scenario, compact),
        Commands::Config { action } => match action {
            ConfigAction::Check => {
                if warnings.is_empty() {
                    println!("Configuration OK");
                } else {
                    for w in &warnings {
                        println!("{}: {}", w.field, w.message);
                    }
                }
                Ok(())
            }
            ConfigAction::Dump => {
                print!("{}", config.to_toml_string()?);
                Ok(())
            }
            ConfigAction::Paths => {
                for path in config::config_paths() {
                    let marker = if path.exists() { "*" } else { " " };
                    println!("{} {}", marker, path.display());
                }
                Ok(())
            }
        },
    }
}

fn run_scenario(config: Config, path: &Path, compact: bool) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
    let scenario = Scenario::from_json_str(&content)
        .with_context(|| format!("Invalid scenario: {}", path.display()))?;

    info!("Running {} step(s) from {}", scenario.steps.len(), path.display());
    let mut engine = LayoutEngine::new(config);
    let reports = scenario.run(&mut engine);

    let output = if compact {
        serde_json::to_string(&reports)?
    } else {
        serde_json::to_string_pretty(&reports)?
    };
    println!("{}", output);
    Ok(())
}
