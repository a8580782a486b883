// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::OutputMode;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [deploy]
/// branch = "main"
/// container = "app_prod"
/// compose_file = "docker-compose.prod.yml"
/// output = "streamed"
///
/// [lock]
/// stale_after_secs = 1800
/// ```
///
/// All sections are optional; only `deploy.container` has no default and must
/// come from the file or the command line.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub deploy: RawDeploySection,

    #[serde(default)]
    pub lock: LockSection,
}

/// `[deploy]` section as written by the user.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDeploySection {
    /// Directory holding the git checkout and compose file.
    ///
    /// If `None`, the directory containing the executable is used.
    #[serde(default)]
    pub project_dir: Option<PathBuf>,

    /// Branch to track.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Remote the branch is fetched from.
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Container name queried for liveness.
    #[serde(default)]
    pub container: Option<String>,

    /// Explicit compose file; if `None` compose uses its own discovery.
    #[serde(default)]
    pub compose_file: Option<PathBuf>,

    /// Compose entry point, split on whitespace (`"docker compose"` or
    /// `"docker-compose"`).
    #[serde(default = "default_compose_command")]
    pub compose_command: String,

    /// Container runtime binary used for `inspect` and `image prune`.
    #[serde(default = "default_docker_command")]
    pub docker_command: String,

    #[serde(default)]
    pub output: OutputMode,

    /// Exit non-zero when a confirmed deploy fails.
    #[serde(default = "default_true")]
    pub fail_on_deploy_error: bool,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_compose_command() -> String {
    "docker compose".to_string()
}

fn default_docker_command() -> String {
    "docker".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for RawDeploySection {
    fn default() -> Self {
        Self {
            project_dir: None,
            branch: default_branch(),
            remote: default_remote(),
            container: None,
            compose_file: None,
            compose_command: default_compose_command(),
            docker_command: default_docker_command(),
            output: OutputMode::default(),
            fail_on_deploy_error: default_true(),
        }
    }
}

/// `[lock]` section: advisory lock held for the duration of a deploy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Lock file path; relative paths are resolved against the project dir.
    #[serde(default = "default_lock_path")]
    pub path: PathBuf,

    /// A lock file older than this is considered abandoned.
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
}

fn default_lock_path() -> PathBuf {
    PathBuf::from(".autodeploy.lock")
}

fn default_stale_after_secs() -> u64 {
    30 * 60
}

impl Default for LockSection {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_lock_path(),
            stale_after_secs: default_stale_after_secs(),
        }
    }
}

/// Values given on the command line; each `Some` replaces the file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub project_dir: Option<PathBuf>,
    pub branch: Option<String>,
    pub remote: Option<String>,
    pub container: Option<String>,
    pub compose_file: Option<PathBuf>,
    pub output: Option<OutputMode>,
    pub disable_lock: bool,
}

impl RawConfigFile {
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        let deploy = &mut self.deploy;
        if let Some(ref dir) = overrides.project_dir {
            deploy.project_dir = Some(dir.clone());
        }
        if let Some(ref branch) = overrides.branch {
            deploy.branch = branch.clone();
        }
        if let Some(ref remote) = overrides.remote {
            deploy.remote = remote.clone();
        }
        if let Some(ref container) = overrides.container {
            deploy.container = Some(container.clone());
        }
        if let Some(ref file) = overrides.compose_file {
            deploy.compose_file = Some(file.clone());
        }
        if let Some(mode) = overrides.output {
            deploy.output = mode;
        }
        if overrides.disable_lock {
            self.lock.enabled = false;
        }
    }
}

/// Validated configuration handed to the reconciler.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub deploy: DeploySettings,
    pub lock: LockSection,
}

/// Validated `[deploy]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySettings {
    pub project_dir: Option<PathBuf>,
    pub branch: String,
    pub remote: String,
    pub container: String,
    pub compose_file: Option<PathBuf>,
    /// Program followed by its leading arguments, e.g. `["docker", "compose"]`.
    pub compose_command: Vec<String>,
    pub docker_command: String,
    pub output: OutputMode,
    pub fail_on_deploy_error: bool,
}

impl DeploySettings {
    /// Local ref compared against the remote, e.g. `main`.
    pub fn local_ref(&self) -> &str {
        &self.branch
    }

    /// Remote-tracking ref, e.g. `origin/main`.
    pub fn remote_ref(&self) -> String {
        format!("{}/{}", self.remote, self.branch)
    }
}

impl ConfigFile {
    pub(crate) fn new_unchecked(deploy: DeploySettings, lock: LockSection) -> Self {
        Self { deploy, lock }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_deploy_section_matches_empty_one() {
        let absent: RawConfigFile = toml::from_str("").unwrap();
        let empty: RawConfigFile = toml::from_str("[deploy]\n").unwrap();

        for deploy in [&absent.deploy, &empty.deploy] {
            assert!(deploy.fail_on_deploy_error);
            assert_eq!(deploy.branch, "main");
            assert_eq!(deploy.remote, default_remote());
            assert_eq!(deploy.compose_command, default_compose_command());
            assert_eq!(deploy.docker_command, default_docker_command());
        }
    }
}
