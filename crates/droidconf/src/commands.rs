//! Subcommand implementations.

use crate::cli::{DepsFormat, ResolveFormat};
use crate::output::{self, print_json, print_success};
use anyhow::{Context, Result};
use droidconf_core::ConfigResolver;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Reads a descriptor from `path`, or from stdin when `path` is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("failed to read descriptor from stdin")?;
        return Ok(content);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn display_name(path: &Path) -> String {
    if path == Path::new("-") {
        "<stdin>".to_string()
    } else {
        path.display().to_string()
    }
}

pub fn cmd_resolve(resolver: &ConfigResolver, file: &Path, format: ResolveFormat) -> Result<()> {
    let content = read_input(file)?;
    let resolution = resolver
        .resolve_report(&content)
        .with_context(|| format!("failed to resolve {}", display_name(file)))?;

    match format {
        ResolveFormat::Text => output::print_descriptor(&resolution.descriptor),
        ResolveFormat::Json => print_json(&resolution)?,
        ResolveFormat::Kts => print!("{}", resolution.descriptor.to_kotlin_dsl()),
    }
    Ok(())
}

pub fn cmd_check(resolver: &ConfigResolver, file: &Path) -> Result<()> {
    let content = read_input(file)?;
    let resolution = resolver
        .resolve_report(&content)
        .with_context(|| format!("failed to resolve {}", display_name(file)))?;

    let name = display_name(file);
    match resolution.warnings.len() {
        0 => print_success(&format!("{name}: ok")),
        1 => print_success(&format!("{name}: ok (1 warning)")),
        n => print_success(&format!("{name}: ok ({n} warnings)")),
    }
    Ok(())
}

#[derive(Serialize)]
struct DepsReport<'a> {
    dependencies: &'a [droidconf_core::MergedDependency],
    warnings: &'a [droidconf_core::Warning],
}

pub fn cmd_deps(resolver: &ConfigResolver, file: &Path, format: DepsFormat) -> Result<()> {
    let content = read_input(file)?;
    let resolution = resolver
        .resolve_report(&content)
        .with_context(|| format!("failed to resolve {}", display_name(file)))?;
    let merged = resolver.merged_dependencies(&resolution.descriptor);
    debug!(count = merged.len(), "merged dependencies");

    match format {
        DepsFormat::Text => output::print_dependencies(&merged),
        DepsFormat::Json => print_json(&DepsReport {
            dependencies: &merged,
            warnings: &resolution.warnings,
        })?,
    }
    Ok(())
}
