mod commands;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use logging::{init_logging, LogFormat, LoggingConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "dimark")]
#[command(version)]
#[command(about = "Generate dependency injection registrations from marker attributes")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate registration sources for a compilation snapshot
    Generate {
        /// Compilation snapshot (.json, .yaml or .yml)
        input: PathBuf,

        /// Output directory for generated units
        #[arg(long, short, default_value = "Generated")]
        out: PathBuf,

        /// Generator configuration file (YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print units instead of writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Report diagnostics without generating
    Check {
        /// Compilation snapshot (.json, .yaml or .yml)
        input: PathBuf,

        /// Generator configuration file (YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Treat warnings as errors
        #[arg(long)]
        deny_warnings: bool,

        /// Output diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize registrations, interfaces and modules
    Map {
        /// Compilation snapshot (.json, .yaml or .yml)
        input: PathBuf,

        /// Generator configuration file (YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long, conflicts_with = "yaml")]
        json: bool,

        /// Output as YAML
        #[arg(long)]
        yaml: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(&LoggingConfig::from_verbosity(cli.verbose, cli.log_format))
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    match cli.command {
        Commands::Generate {
            input,
            out,
            config,
            dry_run,
        } => commands::generate::run(&input, &out, config.as_deref(), dry_run),
        Commands::Check {
            input,
            config,
            deny_warnings,
            json,
        } => commands::check::run(&input, config.as_deref(), deny_warnings, json),
        Commands::Map {
            input,
            config,
            json,
            yaml,
        } => {
            commands::map::run(&input, config.as_deref(), json, yaml)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
