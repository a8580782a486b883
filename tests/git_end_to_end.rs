// tests/git_end_to_end.rs
//
// Drives the real process runner against real git repositories. The container
// runtime is replaced by small shell scripts so no docker daemon is needed.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use autodeploy::engine::{ReconcileOutcome, Reconciler};
use autodeploy::exec::RealProcessRunner;
use autodeploy::types::OutputMode;
use autodeploy_test_utils::builders::ConfigFileBuilder;
use autodeploy_test_utils::init_tracing;

fn git_available() -> bool {
    StdCommand::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn configure_identity(dir: &Path) {
    run_git(dir, &["config", "user.name", "test-user"]);
    run_git(dir, &["config", "user.email", "test@example.com"]);
}

fn commit(dir: &Path, message: &str) {
    run_git(dir, &["commit", "--allow-empty", "-m", message]);
}

fn write_script(path: &Path, body: &str) {
    std::fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = std::fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).unwrap();
}

struct Fixture {
    _root: tempfile::TempDir,
    upstream_work: PathBuf,
    deploy: PathBuf,
    docker: PathBuf,
    compose: PathBuf,
    compose_log: PathBuf,
}

/// origin.git (bare) <- work (pushes) ; deploy (clone being reconciled)
fn fixture() -> Fixture {
    let root = tempfile::tempdir().unwrap();
    let base = root.path().to_path_buf();
    let origin = base.join("origin.git");
    let work = base.join("work");
    let deploy = base.join("deploy");

    std::fs::create_dir_all(&origin).unwrap();
    run_git(&origin, &["init", "--bare"]);

    std::fs::create_dir_all(&work).unwrap();
    run_git(&work, &["init"]);
    configure_identity(&work);
    run_git(&work, &["checkout", "-b", "main"]);
    commit(&work, "initial");
    run_git(&work, &["remote", "add", "origin", origin.to_str().unwrap()]);
    run_git(&work, &["push", "origin", "main"]);

    run_git(
        &base,
        &["clone", "-b", "main", origin.to_str().unwrap(), deploy.to_str().unwrap()],
    );
    configure_identity(&deploy);

    let docker = base.join("fake-docker");
    write_script(&docker, "echo true");

    let compose_log = base.join("compose.log");
    let compose = base.join("fake-compose");
    write_script(&compose, &format!("echo \"$@\" >> {}", compose_log.display()));

    Fixture {
        _root: root,
        upstream_work: work,
        deploy,
        docker,
        compose,
        compose_log,
    }
}

fn reconciler(f: &Fixture) -> Reconciler<RealProcessRunner> {
    let settings = ConfigFileBuilder::new()
        .without_lock()
        .output(OutputMode::Captured)
        .docker_command(f.docker.to_str().unwrap())
        .compose_command(f.compose.to_str().unwrap())
        .build()
        .deploy;
    Reconciler::new(settings, RealProcessRunner::new(&f.deploy))
}

#[tokio::test]
async fn pushes_to_upstream_are_pulled_and_deployed() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    init_tracing();
    let f = fixture();
    let mut reconciler = reconciler(&f);

    assert_eq!(reconciler.reconcile().await, ReconcileOutcome::NoOpUpToDate);
    assert!(!f.compose_log.exists());

    commit(&f.upstream_work, "feature");
    run_git(&f.upstream_work, &["push", "origin", "main"]);
    let upstream_head = run_git(&f.upstream_work, &["rev-parse", "HEAD"]);

    assert_eq!(reconciler.reconcile().await, ReconcileOutcome::Deployed);
    assert_eq!(run_git(&f.deploy, &["rev-parse", "HEAD"]), upstream_head);
    let compose_calls = std::fs::read_to_string(&f.compose_log).unwrap();
    assert_eq!(compose_calls.trim(), "up -d --build");

    assert_eq!(reconciler.reconcile().await, ReconcileOutcome::NoOpUpToDate);
}

#[tokio::test]
async fn diverged_checkout_reports_pull_failure() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    init_tracing();
    let f = fixture();

    commit(&f.upstream_work, "upstream change");
    run_git(&f.upstream_work, &["push", "origin", "main"]);
    commit(&f.deploy, "local hotfix");

    let mut reconciler = reconciler(&f);
    assert_eq!(reconciler.reconcile().await, ReconcileOutcome::PullFailed);
    assert!(!f.compose_log.exists(), "nothing may be rebuilt after a failed pull");
}
