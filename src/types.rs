use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How an action command (fetch, pull, compose up, prune) is executed.
///
/// - `Captured`: stdout is collected and returned trimmed; nothing is shown
///   unless the command fails.
/// - `Streamed`: the child inherits our stdout/stderr so build output shows up
///   live in the scheduler's log (default).
///
/// Queries whose output we parse are always captured regardless of this
/// setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Captured,
    Streamed,
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Streamed
    }
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "captured" => Ok(OutputMode::Captured),
            "streamed" => Ok(OutputMode::Streamed),
            other => Err(format!(
                "invalid output mode: {other} (expected \"captured\" or \"streamed\")"
            )),
        }
    }
}

/// Opaque identifier of a commit, as printed by `git rev-parse`.
///
/// Only equality is meaningful. An empty string is never a valid id, so
/// absence is expressed as `Option<RevisionId>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevisionId(String);

impl RevisionId {
    /// Build an id from raw tool output. Returns `None` for blank output.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 characters, for log lines.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(12) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Liveness of the deployed container as reported by the container runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStatus {
    Running,
    Stopped,
    /// The query itself failed (runtime unreachable, container absent) or
    /// returned something we do not understand.
    Unknown,
}

impl DeploymentStatus {
    /// Interpret the output of `docker inspect -f {{.State.Running}}`.
    pub fn from_inspect_output(output: Option<&str>) -> Self {
        match output.map(|s| s.trim().to_lowercase()) {
            Some(s) if s == "true" => DeploymentStatus::Running,
            Some(s) if s == "false" => DeploymentStatus::Stopped,
            _ => DeploymentStatus::Unknown,
        }
    }

    pub fn is_running(self) -> bool {
        self == DeploymentStatus::Running
    }
}
