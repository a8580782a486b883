// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::ConfigOverrides;
use crate::types::OutputMode;

/// Command-line arguments for `autodeploy`.
///
/// Everything is optional: a scheduler entry is usually just the binary path,
/// with settings coming from `Autodeploy.toml`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "autodeploy",
    version,
    about = "Redeploy a docker compose service when its git branch moves.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Autodeploy.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project directory (git checkout + compose file).
    ///
    /// Default: the directory containing this executable.
    #[arg(long, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Branch to track.
    #[arg(long, value_name = "NAME")]
    pub branch: Option<String>,

    /// Git remote to fetch from.
    #[arg(long, value_name = "NAME")]
    pub remote: Option<String>,

    /// Container name used for liveness checks.
    #[arg(long, value_name = "NAME")]
    pub container: Option<String>,

    /// Compose file passed to `compose -f`.
    #[arg(long, value_name = "PATH")]
    pub compose_file: Option<PathBuf>,

    /// How fetch/pull/build output is handled.
    #[arg(long, value_enum, value_name = "MODE")]
    pub output: Option<OutputMode>,

    /// Only check liveness and start the container if needed.
    #[arg(long)]
    pub heal_only: bool,

    /// Do not take the deploy lock.
    #[arg(long)]
    pub no_lock: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `AUTODEPLOY_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load config, print the command plan, but don't execute any commands.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            project_dir: self.project_dir.clone(),
            branch: self.branch.clone(),
            remote: self.remote.clone(),
            container: self.container.clone(),
            compose_file: self.compose_file.clone(),
            output: self.output,
            disable_lock: self.no_lock,
        }
    }
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
