//! Library interface for the tplfold CLI
//!
//! This module exposes the driver steps (discovery, loading, rewriting,
//! writing) for integration testing while keeping argument handling in
//! main.rs.

pub mod discovery;
pub mod report;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tplfold_core::{Config, RewriteConfig};
use tplfold_engine::{builtin, Program, RewriteOptions, RewrittenUnit, SourceUnit};

pub use discovery::{discover_files, FileFilter};

/// Read and parse `files` into one program
pub fn load_program(files: &[PathBuf]) -> Result<Program> {
    let units = files
        .iter()
        .map(|path| {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            SourceUnit::parse(path.clone(), text)
                .with_context(|| format!("Failed to parse {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Program::new(units))
}

/// Rewrite every unit of `program` with the configured transform
pub fn rewrite_program(program: &Program, config: &RewriteConfig) -> Vec<RewrittenUnit> {
    let transform = builtin(config.transform);
    program.rewrite_all(transform.as_ref(), RewriteOptions::from(config))
}

/// Discover, load and rewrite `paths`
pub fn run(paths: &[PathBuf], config: &Config) -> Result<Vec<RewrittenUnit>> {
    let filter = FileFilter::new(&config.files)?;
    let files = discover_files(paths, &filter)?;
    if files.is_empty() {
        tracing::warn!("No source files found");
    }

    let program = load_program(&files)?;
    Ok(rewrite_program(&program, &config.rewrite))
}

/// Write every changed unit back to its file; returns how many were written
pub fn write_changes(units: &[RewrittenUnit]) -> Result<usize> {
    let mut written = 0;
    for unit in units.iter().filter(|unit| unit.is_changed()) {
        fs::write(&unit.path, &unit.source)
            .with_context(|| format!("Failed to write {}", unit.path.display()))?;
        tracing::info!(
            file = %unit.path.display(),
            folded = unit.replacements.len(),
            "Rewrote file"
        );
        written += 1;
    }
    Ok(written)
}
