//! Command-line arguments.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "droidconf")]
#[command(about = "Validate and normalize Android Gradle Kotlin DSL build descriptors")]
#[command(version)]
pub struct Cli {
    /// Resolver config file (default: droidconf.toml in the working directory)
    #[arg(short, long, global = true, env = "DROIDCONF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve a descriptor and print the normalized result
    Resolve {
        /// build.gradle.kts to read, or `-` for stdin
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = ResolveFormat::Text)]
        format: ResolveFormat,
    },

    /// Validate a descriptor; the exit code reports the outcome
    Check {
        /// build.gradle.kts to read, or `-` for stdin
        file: PathBuf,
    },

    /// Print the merged dependency list
    Deps {
        /// build.gradle.kts to read, or `-` for stdin
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = DepsFormat::Text)]
        format: DepsFormat,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ResolveFormat {
    #[default]
    Text,
    Json,
    /// Canonical Kotlin DSL
    Kts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DepsFormat {
    #[default]
    Text,
    Json,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is not set.
    pub const fn default_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
