// src/exec/backend.rs

//! Pluggable process runner abstraction.
//!
//! The reconciler talks to a `ProcessRunner` instead of spawning processes
//! itself. Production code uses [`RealProcessRunner`]; tests provide a fake
//! that answers from a script and records every command it was asked to run.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use crate::commands::CommandLine;
use crate::types::OutputMode;

use super::process::run_command;

/// Result of one external invocation.
///
/// - `Some(stdout)` on zero exit (trimmed; empty in streamed mode).
/// - `None` when the command could not be spawned or exited non-zero.
pub type CommandResult = Option<String>;

/// Trait abstracting how external commands are executed.
pub trait ProcessRunner: Send {
    /// Run `cmd` to completion in the project directory.
    ///
    /// Implementations must not return early: the reconciler relies on every
    /// step having finished before the next one starts.
    fn run<'a>(
        &'a mut self,
        cmd: &'a CommandLine,
        mode: OutputMode,
    ) -> Pin<Box<dyn Future<Output = CommandResult> + Send + 'a>>;
}

/// Real runner used in production, backed by `tokio::process`.
#[derive(Debug, Clone)]
pub struct RealProcessRunner {
    workdir: PathBuf,
}

impl RealProcessRunner {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

impl ProcessRunner for RealProcessRunner {
    fn run<'a>(
        &'a mut self,
        cmd: &'a CommandLine,
        mode: OutputMode,
    ) -> Pin<Box<dyn Future<Output = CommandResult> + Send + 'a>> {
        Box::pin(run_command(&self.workdir, cmd, mode))
    }
}
