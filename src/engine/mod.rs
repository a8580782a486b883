// src/engine/mod.rs

//! Reconciliation engine.
//!
//! One call to [`Reconciler::reconcile`] is one pass of the watchdog: check
//! liveness, compare the local checkout against the remote, and deploy when
//! they differ. The engine never returns an error; every collaborator failure
//! is folded into a [`ReconcileOutcome`].

use std::fmt;

pub mod lock;
pub mod reconciler;

pub use lock::{DeployLock, LockAttempt, LockGuard};
pub use reconciler::{command_plan, Reconciler};

/// Terminal result of one invocation. Used for logging and the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Local and remote revisions match; nothing to deploy.
    NoOpUpToDate,
    /// Heal-only pass that had to start the deployment, and the start succeeded.
    RecoveredOnly,
    /// Heal-only pass whose start command failed.
    RecoveryFailed,
    /// Fetch or revision resolution failed; only liveness was ensured.
    FetchFailed,
    /// New revision pulled, rebuilt and restarted.
    Deployed,
    /// Fast-forward pull failed; nothing was rebuilt.
    PullFailed,
    /// Rebuild-and-restart failed after the pull.
    DeployFailed,
    /// Another invocation holds the deploy lock; deploy deferred.
    DeployLocked,
}

impl ReconcileOutcome {
    /// A confirmed version mismatch that we could not deploy.
    pub fn is_failure(self) -> bool {
        matches!(self, ReconcileOutcome::PullFailed | ReconcileOutcome::DeployFailed)
    }

    /// Process exit status for this outcome.
    pub fn exit_code(self, fail_on_deploy_error: bool) -> i32 {
        if fail_on_deploy_error && self.is_failure() {
            2
        } else {
            0
        }
    }
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReconcileOutcome::NoOpUpToDate => "up to date",
            ReconcileOutcome::RecoveredOnly => "recovered",
            ReconcileOutcome::RecoveryFailed => "recovery failed",
            ReconcileOutcome::FetchFailed => "fetch failed",
            ReconcileOutcome::Deployed => "deployed",
            ReconcileOutcome::PullFailed => "pull failed",
            ReconcileOutcome::DeployFailed => "deploy failed",
            ReconcileOutcome::DeployLocked => "deploy locked",
        };
        f.write_str(s)
    }
}

/// Result of a step whose failure must not change control flow.
///
/// Returned by recovery starts and image pruning so the "try, log, move on"
/// contract is visible in the signature. The full pass discards it; the
/// heal-only pass reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestEffort {
    Done,
    Failed,
}

impl BestEffort {
    pub fn from_result<T>(result: &Option<T>) -> Self {
        if result.is_some() {
            BestEffort::Done
        } else {
            BestEffort::Failed
        }
    }
}
