// src/config/validate.rs

use crate::config::model::{ConfigFile, DeploySettings, LockSection, RawConfigFile, RawDeploySection};
use crate::errors::{AutodeployError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::AutodeployError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let deploy = validate_deploy(raw.deploy)?;
        validate_lock(&raw.lock)?;
        Ok(ConfigFile::new_unchecked(deploy, raw.lock))
    }
}

fn validate_deploy(raw: RawDeploySection) -> Result<DeploySettings> {
    let container = match raw.container.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            return Err(AutodeployError::ConfigError(
                "[deploy].container must be set (in the config file or with --container)"
                    .to_string(),
            ));
        }
    };

    validate_ref_component("branch", &raw.branch)?;
    validate_ref_component("remote", &raw.remote)?;

    let compose_command: Vec<String> = raw
        .compose_command
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if compose_command.is_empty() {
        return Err(AutodeployError::ConfigError(
            "[deploy].compose_command must not be empty".to_string(),
        ));
    }

    let docker_command = raw.docker_command.trim().to_string();
    if docker_command.is_empty() {
        return Err(AutodeployError::ConfigError(
            "[deploy].docker_command must not be empty".to_string(),
        ));
    }

    Ok(DeploySettings {
        project_dir: raw.project_dir,
        branch: raw.branch,
        remote: raw.remote,
        container,
        compose_file: raw.compose_file,
        compose_command,
        docker_command,
        output: raw.output,
        fail_on_deploy_error: raw.fail_on_deploy_error,
    })
}

/// Branch and remote names end up as git arguments; reject anything git would
/// read as an option or split into several arguments.
fn validate_ref_component(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(AutodeployError::ConfigError(format!(
            "[deploy].{field} must not be empty"
        )));
    }
    if value.starts_with('-') {
        return Err(AutodeployError::ConfigError(format!(
            "[deploy].{field} must not start with '-' (got {value:?})"
        )));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(AutodeployError::ConfigError(format!(
            "[deploy].{field} must not contain whitespace (got {value:?})"
        )));
    }
    Ok(())
}

fn validate_lock(lock: &LockSection) -> Result<()> {
    if lock.enabled && lock.stale_after_secs == 0 {
        return Err(AutodeployError::ConfigError(
            "[lock].stale_after_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    if lock.enabled && lock.path.as_os_str().is_empty() {
        return Err(AutodeployError::ConfigError(
            "[lock].path must not be empty".to_string(),
        ));
    }
    Ok(())
}
