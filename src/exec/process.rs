// src/exec/process.rs

//! Running a single external command to completion.

use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::{debug, error, warn};

use crate::commands::CommandLine;
use crate::types::OutputMode;

use super::backend::CommandResult;

/// Run `cmd` in `workdir` and fold every failure into `None`.
///
/// Spawn errors (binary missing, directory gone) are logged at `error`;
/// non-zero exits at `warn` together with the captured stderr.
pub async fn run_command(workdir: &Path, cmd: &CommandLine, mode: OutputMode) -> CommandResult {
    debug!(cmd = %cmd, ?mode, "running command");

    let result = match mode {
        OutputMode::Captured => run_captured(workdir, cmd).await,
        OutputMode::Streamed => run_streamed(workdir, cmd).await,
    };

    match result {
        Ok(output) => output,
        Err(err) => {
            error!(cmd = %cmd, error = %err, "command could not be executed");
            None
        }
    }
}

fn build(workdir: &Path, cmd: &CommandLine) -> Command {
    let mut command = Command::new(&cmd.program);
    command
        .args(&cmd.args)
        .current_dir(workdir)
        .stdin(Stdio::null())
        .kill_on_drop(true);
    command
}

async fn run_captured(workdir: &Path, cmd: &CommandLine) -> Result<CommandResult> {
    let output = build(workdir, cmd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .with_context(|| format!("spawning `{cmd}`"))?;

    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(cmd = %cmd, stdout = %stdout, "command succeeded");
        return Ok(Some(stdout));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    warn!(
        cmd = %cmd,
        exit_code = output.status.code().unwrap_or(-1),
        stderr = %stderr.trim(),
        "command failed"
    );
    Ok(None)
}

async fn run_streamed(workdir: &Path, cmd: &CommandLine) -> Result<CommandResult> {
    let status = build(workdir, cmd)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .with_context(|| format!("spawning `{cmd}`"))?;

    if status.success() {
        return Ok(Some(String::new()));
    }

    warn!(
        cmd = %cmd,
        exit_code = status.code().unwrap_or(-1),
        "command failed"
    );
    Ok(None)
}
