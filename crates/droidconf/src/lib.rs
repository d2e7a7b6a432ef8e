//! Command-line front end for droidconf.

pub mod cli;
pub mod commands;
pub mod output;

use anyhow::{Context, Result};
use cli::{Cli, Command};
use droidconf_core::{ConfigResolver, ResolveError, ResolverConfig, exit_codes};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber. `RUST_LOG` overrides the verbosity flags.
pub fn init_tracing(cli: &Cli) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.default_log_level())),
        )
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .without_time()
        .init();
}

/// Runs the selected subcommand.
pub fn run(cli: &Cli) -> Result<()> {
    if cli.no_color {
        output::disable_colors();
    }

    let cwd = std::env::current_dir().context("failed to determine working directory")?;
    let (config, path) = ResolverConfig::discover(cli.config.as_deref(), &cwd)?;
    match &path {
        Some(path) => debug!(path = %path.display(), "using resolver config"),
        None => debug!("no resolver config found, using defaults"),
    }
    let resolver = ConfigResolver::new(config);

    match &cli.command {
        Command::Resolve { file, format } => commands::cmd_resolve(&resolver, file, *format),
        Command::Check { file } => commands::cmd_check(&resolver, file),
        Command::Deps { file, format } => commands::cmd_deps(&resolver, file, *format),
    }
}

/// Process exit code for a failed run: resolution failures report their own
/// code, anything else (I/O, configuration) counts as unreadable input.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<ResolveError>()
        .map_or(exit_codes::PARSE_ERROR, ResolveError::exit_code)
}
