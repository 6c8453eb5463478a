//! idlsmith CLI orchestrator
//!
//! This binary provides the main entry point for idlsmith: generating
//! artifacts from a registry snapshot, checking a snapshot, and writing a
//! starter configuration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use config::Config;
use idlsmith_cli::{init_config, Overrides, Result};

/// Command-line interface configuration for idlsmith.
#[derive(Parser, Debug)]
#[command(name = "idlsmith", about = "Thrift IDL and service glue from a registry snapshot", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
    /// Configuration file (defaults to the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log level or filter directive, overriding the configuration
    #[arg(long, global = true)]
    log_level: Option<String>,
}

/// Available idlsmith commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a snapshot and write the generated artifacts
    Generate {
        /// Registry snapshot JSON
        #[arg(long)]
        input: Option<PathBuf>,
        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,
        /// Root name for the dispatch class and file names
        #[arg(long)]
        root: Option<String>,
        /// Skip create/update/remove operations
        #[arg(long)]
        no_crud: bool,
        /// Fail on relations to unknown entities
        #[arg(long)]
        strict: bool,
    },
    /// Analyze a snapshot without generating anything
    Check {
        /// Registry snapshot JSON
        #[arg(long)]
        input: Option<PathBuf>,
        /// Fail on relations to unknown entities
        #[arg(long)]
        strict: bool,
    },
    /// Write a default configuration file
    InitConfig {
        /// Destination (defaults to the user config dir)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn load_config(cli: &Cli, overrides: &Overrides) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    overrides.apply(&mut config);

    let level = cli.log_level.clone().unwrap_or_else(|| config.logging.level.clone());
    if let Err(e) = logging::init(&level, config.logging.file.as_deref()) {
        eprintln!("Warning: {}", e);
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    match &cli.cmd {
        Commands::Generate { input, output, root, no_crud, strict } => {
            let overrides = Overrides {
                input: input.clone(),
                output: output.clone(),
                root: root.clone(),
                no_crud: *no_crud,
                strict: *strict,
            };
            let config = load_config(&cli, &overrides)?;
            let report = pipeline::compile(&config)?;
            for path in &report.files {
                println!("{}", path.display());
            }
            tracing::info!("{} warnings", report.diagnostics.warnings.len());
        }
        Commands::Check { input, strict } => {
            let overrides = Overrides { input: input.clone(), strict: *strict, ..Overrides::default() };
            let config = load_config(&cli, &overrides)?;
            let diagnostics = pipeline::check(&config)?;
            for warning in &diagnostics.warnings {
                println!("warning: {}", warning);
            }
            println!("{} definitions checked", diagnostics.total_definitions);
        }
        Commands::InitConfig { path } => {
            let written = init_config(path.as_deref())?;
            println!("Wrote {}", written.display());
        }
    }
    Ok(())
}

/// Main entry point for the idlsmith application.
fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("idlsmith failed: {}", e);
            ExitCode::from(1)
        }
    }
}
