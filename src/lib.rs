// src/lib.rs

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, ConfigFile, LockSection};
use crate::engine::{command_plan, DeployLock, Reconciler};
use crate::errors::{AutodeployError, Result};
use crate::exec::RealProcessRunner;
use crate::fs::{FileSystem, RealFileSystem};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - project directory resolution
/// - the process runner and the optional deploy lock
/// - one reconciliation (or heal-only) pass
///
/// Returns the process exit status. Only configuration problems are errors.
pub async fn run(args: CliArgs) -> Result<i32> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let cfg = load_and_validate(fs.as_ref(), args.config.as_deref(), &args.overrides())?;
    let project_dir = resolve_project_dir(fs.as_ref(), cfg.deploy.project_dir.as_deref())?;

    if args.dry_run {
        print_dry_run(&cfg, &project_dir);
        return Ok(0);
    }

    info!(
        project_dir = %project_dir.display(),
        branch = %cfg.deploy.branch,
        container = %cfg.deploy.container,
        "autodeploy pass starting"
    );

    let runner = RealProcessRunner::new(&project_dir);
    let mut reconciler = Reconciler::new(cfg.deploy.clone(), runner);
    if let Some(lock) = build_lock(Arc::clone(&fs), &cfg.lock, &project_dir) {
        reconciler = reconciler.with_lock(lock);
    }

    let outcome = if args.heal_only {
        reconciler.heal().await
    } else {
        reconciler.reconcile().await
    };

    let code = outcome.exit_code(cfg.deploy.fail_on_deploy_error);
    info!(%outcome, exit_code = code, "autodeploy pass finished");
    Ok(code)
}

/// Resolve and check the project directory.
///
/// - An explicit directory (config or `--project-dir`) is used as given.
/// - Otherwise the directory containing the running executable is used, so
///   the binary can live next to the checkout it deploys.
///
/// A missing directory is fatal: no git or compose command is safe to run
/// anywhere else.
pub fn resolve_project_dir(fs: &dyn FileSystem, configured: Option<&Path>) -> Result<PathBuf> {
    let dir = match configured {
        Some(dir) => dir.to_path_buf(),
        None => executable_dir()?,
    };

    if !fs.is_dir(&dir) {
        return Err(AutodeployError::ProjectDirMissing(dir));
    }

    let dir = fs.canonicalize(&dir)?;
    debug!(project_dir = %dir.display(), "resolved project directory");
    Ok(dir)
}

/// Directory containing the running executable.
pub fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("locating the running executable")?;
    match exe.parent() {
        Some(parent) => Ok(parent.to_path_buf()),
        None => Err(AutodeployError::ConfigError(format!(
            "executable path has no parent directory: {}",
            exe.display()
        ))),
    }
}

/// Build the deploy lock if enabled; relative lock paths live in the project dir.
pub fn build_lock(
    fs: Arc<dyn FileSystem>,
    lock: &LockSection,
    project_dir: &Path,
) -> Option<DeployLock> {
    if !lock.enabled {
        return None;
    }
    let path = if lock.path.is_absolute() {
        lock.path.clone()
    } else {
        project_dir.join(&lock.path)
    };
    Some(DeployLock::new(
        fs,
        path,
        Duration::from_secs(lock.stale_after_secs),
    ))
}

/// Simple dry-run output: print settings and the commands a pass may run.
fn print_dry_run(cfg: &ConfigFile, project_dir: &Path) {
    let deploy = &cfg.deploy;
    println!("autodeploy dry-run");
    println!("  project_dir = {}", project_dir.display());
    println!("  branch = {}", deploy.branch);
    println!("  remote = {}", deploy.remote);
    println!("  container = {}", deploy.container);
    if let Some(ref file) = deploy.compose_file {
        println!("  compose_file = {}", file.display());
    }
    println!("  output = {:?}", deploy.output);
    println!("  fail_on_deploy_error = {}", deploy.fail_on_deploy_error);
    if cfg.lock.enabled {
        println!(
            "  lock = {} (stale after {}s)",
            cfg.lock.path.display(),
            cfg.lock.stale_after_secs
        );
    } else {
        println!("  lock = disabled");
    }
    println!();

    println!("commands:");
    for (label, cmd) in command_plan(deploy) {
        println!("  {label:<16} {cmd}");
    }

    debug!("dry-run complete (no execution)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn missing_project_dir_is_fatal() {
        let fs = MockFileSystem::new();
        let err = resolve_project_dir(&fs, Some(Path::new("/srv/missing"))).unwrap_err();
        match err {
            AutodeployError::ProjectDirMissing(dir) => assert_eq!(dir, PathBuf::from("/srv/missing")),
            other => panic!("expected ProjectDirMissing, got {other:?}"),
        }
    }

    #[test]
    fn existing_project_dir_is_returned() {
        let fs = MockFileSystem::new();
        fs.add_dir("/srv/app");
        let dir = resolve_project_dir(&fs, Some(Path::new("/srv/app"))).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/app"));
    }

    #[test]
    fn lock_path_is_relative_to_project_dir() {
        let fs: Arc<dyn FileSystem> = Arc::new(MockFileSystem::new());
        let lock = build_lock(fs, &LockSection::default(), Path::new("/srv/app")).unwrap();
        assert_eq!(lock.path(), Path::new("/srv/app/.autodeploy.lock"));
    }

    #[test]
    fn disabled_lock_is_not_built() {
        let fs: Arc<dyn FileSystem> = Arc::new(MockFileSystem::new());
        let section = LockSection {
            enabled: false,
            ..LockSection::default()
        };
        assert!(build_lock(fs, &section, Path::new("/srv/app")).is_none());
    }
}
