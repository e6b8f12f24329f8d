//! tplfold CLI - static template folding for TypeScript and JavaScript
//!
//! This binary provides the command-line interface for the tplfold engine.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tplfold::report;
use tplfold_core::config::{Config, TransformKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tplfold")]
#[command(about = "Fold constant template expressions into string literals")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Transform applied to folded templates (identity, uppercase, minify)
    #[arg(short, long, global = true)]
    transform: Option<TransformKind>,

    /// Object-literal property whose value is folded
    #[arg(short, long, value_name = "NAME", global = true)]
    property: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite files, printing the result unless --write is given
    Rewrite {
        /// Files or directories to process
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write changes back to the files
        #[arg(long, conflicts_with = "check")]
        write: bool,

        /// Exit with a non-zero status if any file would change
        #[arg(long)]
        check: bool,
    },
    /// Report foldable and skipped occurrences without changing anything
    Report {
        /// Files or directories to process
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Rewrite {
            paths,
            write,
            check,
        } => rewrite(&paths, &config, write, check),
        Commands::Report { paths, format } => {
            let units = tplfold::run(&paths, &config)?;
            let output = match format {
                ReportFormat::Text => report::render_text(&units),
                ReportFormat::Json => report::render_json(&units)?,
            };
            print!("{output}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Initialize logging system
///
/// Logs go to stderr so rewritten sources and reports can be piped.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "tplfold={level},tplfold_core={level},tplfold_engine={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Load configuration and apply command-line overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config =
        Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(transform) = cli.transform {
        config.rewrite.transform = transform;
    }
    if let Some(property) = &cli.property {
        config.rewrite.property_name = property.clone();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn rewrite(paths: &[PathBuf], config: &Config, write: bool, check: bool) -> Result<ExitCode> {
    let units = tplfold::run(paths, config)?;
    let changed: Vec<_> = units.iter().filter(|unit| unit.is_changed()).collect();

    if write {
        let written = tplfold::write_changes(&units)?;
        info!("Rewrote {written} of {} files", units.len());
        return Ok(ExitCode::SUCCESS);
    }

    if check {
        for unit in &changed {
            println!("{}", unit.path.display());
        }
        return Ok(if changed.is_empty() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let with_headers = changed.len() > 1;
    for unit in changed {
        if with_headers {
            println!("==> {} <==", unit.path.display());
        }
        print!("{}", unit.source);
    }
    Ok(ExitCode::SUCCESS)
}
