// src/cli.rs

//! CLI argument parsing using `clap`.

use std::num::NonZeroUsize;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `samplegen`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "samplegen",
    version,
    about = "Regenerate reference artifacts by running a generator over every input sample in parallel.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Samplegen.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Samplegen.toml")]
    pub config: String,

    /// Number of generator invocations to run at once.
    ///
    /// Overrides `[config].jobs`; defaults to the number of available CPUs.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<NonZeroUsize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SAMPLEGEN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the task list, but don't run any commands.
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the `[[setup]]` commands.
    #[arg(long)]
    pub skip_setup: bool,

    /// Write every task's log block to stdout instead of per-task files.
    #[arg(long)]
    pub log_to_stdout: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
