// src/engine/reconciler.rs

//! The deployment reconciler.
//!
//! ```text
//! query liveness ──not running──▶ start (best effort)
//!        │
//!        ▼
//! fetch ─▶ rev-parse local / remote
//!        │
//!        ├─ fetch failed or revision absent ─▶ ensure liveness ─▶ FetchFailed
//!        ├─ equal ─────────────────────────▶ NoOpUpToDate
//!        └─ differ ─▶ lock ─▶ pull ─▶ up --build ─▶ prune ─▶ verify ─▶ Deployed
//! ```

use tracing::{info, warn};

use crate::commands::{docker, git, CommandLine};
use crate::config::DeploySettings;
use crate::exec::{CommandResult, ProcessRunner};
use crate::types::{DeploymentStatus, OutputMode, RevisionId};

use super::lock::{DeployLock, LockAttempt};
use super::{BestEffort, ReconcileOutcome};

/// Drives one reconciliation pass against the external tools.
pub struct Reconciler<R: ProcessRunner> {
    settings: DeploySettings,
    runner: R,
    lock: Option<DeployLock>,
}

impl<R: ProcessRunner> Reconciler<R> {
    pub fn new(settings: DeploySettings, runner: R) -> Self {
        Self {
            settings,
            runner,
            lock: None,
        }
    }

    /// Guard the deploy path with an advisory lock.
    pub fn with_lock(mut self, lock: DeployLock) -> Self {
        self.lock = Some(lock);
        self
    }

    pub fn settings(&self) -> &DeploySettings {
        &self.settings
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Full pass: liveness, version check, deploy on mismatch.
    pub async fn reconcile(&mut self) -> ReconcileOutcome {
        let status = self.query_liveness().await;
        if !status.is_running() {
            let _ = self.start_deployment(status).await;
        }

        info!(remote = %self.settings.remote, "checking for new commits");
        let fetched = self.fetch_remote().await;

        let local_ref = self.settings.local_ref().to_string();
        let remote_ref = self.settings.remote_ref();
        let local = self.resolve_revision(&local_ref).await;
        let remote = self.resolve_revision(&remote_ref).await;

        match (fetched, local, remote) {
            (true, Some(local), Some(remote)) if local == remote => {
                info!(revision = %local.short(), "deployment is up to date");
                ReconcileOutcome::NoOpUpToDate
            }
            (true, Some(local), Some(remote)) => {
                info!(
                    from = %local.short(),
                    to = %remote.short(),
                    "new commits detected, deploying"
                );
                self.deploy().await
            }
            (fetched, local, remote) => {
                warn!(
                    fetched,
                    local = local.is_some(),
                    remote = remote.is_some(),
                    "could not determine revisions; only ensuring liveness"
                );
                self.ensure_liveness().await;
                ReconcileOutcome::FetchFailed
            }
        }
    }

    /// Liveness-only pass. Never fetches and never takes the deploy lock.
    ///
    /// Unlike the full pass, the outcome reflects whether the start worked,
    /// since starting is all this pass does.
    pub async fn heal(&mut self) -> ReconcileOutcome {
        let status = self.query_liveness().await;
        if status.is_running() {
            info!(container = %self.settings.container, "container is running");
            return ReconcileOutcome::NoOpUpToDate;
        }
        match self.start_deployment(status).await {
            BestEffort::Done => ReconcileOutcome::RecoveredOnly,
            BestEffort::Failed => ReconcileOutcome::RecoveryFailed,
        }
    }

    async fn query_liveness(&mut self) -> DeploymentStatus {
        let cmd = docker::inspect_running(&self.settings.docker_command, &self.settings.container);
        let output = self.captured(&cmd).await;
        let status = DeploymentStatus::from_inspect_output(output.as_deref());
        info!(container = %self.settings.container, ?status, "liveness");
        status
    }

    /// Bring the deployment up without rebuilding. The result is advisory:
    /// later steps converge anyway, so callers ignore it.
    async fn start_deployment(&mut self, status: DeploymentStatus) -> BestEffort {
        warn!(
            container = %self.settings.container,
            ?status,
            "container is not running, starting it"
        );
        let cmd = docker::compose_up(
            &self.settings.compose_command,
            self.settings.compose_file.as_deref(),
            false,
        );
        let result = BestEffort::from_result(&self.action(&cmd).await);
        if result == BestEffort::Failed {
            warn!(container = %self.settings.container, "recovery start failed");
        }
        result
    }

    async fn ensure_liveness(&mut self) {
        let status = self.query_liveness().await;
        if !status.is_running() {
            let _ = self.start_deployment(status).await;
        }
    }

    async fn fetch_remote(&mut self) -> bool {
        let cmd = git::fetch(&self.settings.remote);
        self.action(&cmd).await.is_some()
    }

    async fn resolve_revision(&mut self, reference: &str) -> Option<RevisionId> {
        let cmd = git::rev_parse(reference);
        let output = self.captured(&cmd).await?;
        RevisionId::parse(&output)
    }

    async fn deploy(&mut self) -> ReconcileOutcome {
        // Held until this function returns.
        let _guard = match self.lock.as_ref().map(DeployLock::try_acquire) {
            None => None,
            Some(LockAttempt::Acquired(guard)) => Some(guard),
            Some(LockAttempt::Held) => {
                info!("another deploy is in progress; deferring to the next run");
                return ReconcileOutcome::DeployLocked;
            }
            Some(LockAttempt::Unavailable(e)) => {
                warn!(error = %e, "could not create deploy lock; deploying unlocked");
                None
            }
        };

        info!(branch = %self.settings.branch, "pulling latest code");
        if !self.pull_latest().await {
            warn!(branch = %self.settings.branch, "pull failed; not rebuilding stale code");
            return ReconcileOutcome::PullFailed;
        }

        info!(container = %self.settings.container, "rebuilding and restarting");
        if !self.rebuild_and_restart().await {
            warn!(container = %self.settings.container, "rebuild failed");
            return ReconcileOutcome::DeployFailed;
        }

        info!(container = %self.settings.container, "deploy completed");
        let _ = self.prune_stale_artifacts().await;
        self.verify_liveness().await;
        ReconcileOutcome::Deployed
    }

    async fn pull_latest(&mut self) -> bool {
        let cmd = git::pull(&self.settings.remote, &self.settings.branch);
        self.action(&cmd).await.is_some()
    }

    async fn rebuild_and_restart(&mut self) -> bool {
        let cmd = docker::compose_up(
            &self.settings.compose_command,
            self.settings.compose_file.as_deref(),
            true,
        );
        self.action(&cmd).await.is_some()
    }

    async fn prune_stale_artifacts(&mut self) -> BestEffort {
        let cmd = docker::image_prune(&self.settings.docker_command);
        let result = BestEffort::from_result(&self.action(&cmd).await);
        if result == BestEffort::Failed {
            warn!("image prune failed");
        }
        result
    }

    /// Log the post-deploy state; never changes the outcome.
    async fn verify_liveness(&mut self) {
        let status = self.query_liveness().await;
        let cmd =
            docker::inspect_started_at(&self.settings.docker_command, &self.settings.container);
        let started_at = self.captured(&cmd).await;
        if status.is_running() {
            info!(
                container = %self.settings.container,
                started_at = started_at.as_deref().unwrap_or("unknown"),
                "container is running after deploy"
            );
        } else {
            warn!(
                container = %self.settings.container,
                ?status,
                "container is not running after deploy"
            );
        }
    }

    async fn captured(&mut self, cmd: &CommandLine) -> CommandResult {
        self.runner.run(cmd, OutputMode::Captured).await
    }

    async fn action(&mut self, cmd: &CommandLine) -> CommandResult {
        let mode = self.settings.output;
        self.runner.run(cmd, mode).await
    }
}

/// Every command a full pass may issue, in order, labelled for `--dry-run`.
pub fn command_plan(settings: &DeploySettings) -> Vec<(&'static str, CommandLine)> {
    let compose_file = settings.compose_file.as_deref();
    vec![
        (
            "liveness",
            docker::inspect_running(&settings.docker_command, &settings.container),
        ),
        (
            "recover",
            docker::compose_up(&settings.compose_command, compose_file, false),
        ),
        ("fetch", git::fetch(&settings.remote)),
        ("local revision", git::rev_parse(settings.local_ref())),
        ("remote revision", git::rev_parse(&settings.remote_ref())),
        ("pull", git::pull(&settings.remote, &settings.branch)),
        (
            "rebuild",
            docker::compose_up(&settings.compose_command, compose_file, true),
        ),
        ("prune", docker::image_prune(&settings.docker_command)),
        (
            "started at",
            docker::inspect_started_at(&settings.docker_command, &settings.container),
        ),
    ]
}
