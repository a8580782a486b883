// src/engine/lock.rs

//! Advisory lock guarding the deploy path.
//!
//! The scheduler may start a new invocation while a previous one is still
//! rebuilding. Only the deploy path takes the lock; liveness checks and
//! recovery starts run unlocked.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::fs::FileSystem;

/// Result of trying to take the lock.
#[derive(Debug)]
pub enum LockAttempt {
    Acquired(LockGuard),
    /// Another invocation holds a fresh lock.
    Held,
    /// The lock file could not be created for some other reason.
    Unavailable(anyhow::Error),
}

/// A lock file created with create-new semantics.
///
/// The file holds a token unique to one acquisition (`pid start-nanos seq`).
/// A guard only removes the file while it still holds its own token, so a
/// run whose lock was taken over as stale cannot release its successor's.
#[derive(Debug, Clone)]
pub struct DeployLock {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    stale_after: Duration,
}

impl DeployLock {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>, stale_after: Duration) -> Self {
        Self {
            fs,
            path: path.into(),
            stale_after,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn try_acquire(&self) -> LockAttempt {
        let token = acquisition_token();
        match self.create(&token) {
            Ok(true) => return LockAttempt::Acquired(self.guard(token)),
            Ok(false) => {}
            Err(e) => return LockAttempt::Unavailable(e),
        }

        match self.fs.modified_age(&self.path) {
            Ok(age) if age < self.stale_after => {
                debug!(path = %self.path.display(), age_secs = age.as_secs(), "deploy lock is held");
                return LockAttempt::Held;
            }
            Ok(age) => {
                let holder = self.fs.read_to_string(&self.path).unwrap_or_default();
                warn!(
                    path = %self.path.display(),
                    age_secs = age.as_secs(),
                    holder = %holder.trim(),
                    "replacing stale deploy lock"
                );
                if let Err(e) = self.fs.remove_file(&self.path) {
                    return LockAttempt::Unavailable(e);
                }
            }
            // Removed between our create attempt and the stat; try again once.
            Err(_) => {}
        }

        match self.create(&token) {
            Ok(true) => LockAttempt::Acquired(self.guard(token)),
            Ok(false) => LockAttempt::Held,
            Err(e) => LockAttempt::Unavailable(e),
        }
    }

    fn create(&self, token: &str) -> anyhow::Result<bool> {
        let contents = format!("{token}\n");
        self.fs.create_new(&self.path, contents.as_bytes())
    }

    fn guard(&self, token: String) -> LockGuard {
        debug!(path = %self.path.display(), %token, "deploy lock acquired");
        LockGuard {
            fs: Arc::clone(&self.fs),
            path: self.path.clone(),
            token,
        }
    }
}

fn acquisition_token() -> String {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{} {nanos} {seq}", std::process::id())
}

/// Removes the lock file when dropped, unless another run has taken it over.
#[derive(Debug)]
pub struct LockGuard {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    token: String,
}

impl LockGuard {
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        match self.fs.read_to_string(&self.path) {
            Ok(holder) if holder.trim() == self.token => {}
            Ok(holder) => {
                warn!(
                    path = %self.path.display(),
                    holder = %holder.trim(),
                    "deploy lock was taken over by another run; leaving it in place"
                );
                return;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "deploy lock vanished before release");
                return;
            }
        }

        if let Err(e) = self.fs.remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to release deploy lock");
        } else {
            debug!(path = %self.path.display(), "deploy lock released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    const LOCK: &str = "/srv/app/.autodeploy.lock";

    fn lock_on(fs: &MockFileSystem) -> DeployLock {
        fs.add_dir("/srv/app");
        DeployLock::new(Arc::new(fs.clone()), LOCK, Duration::from_secs(60))
    }

    #[test]
    fn acquire_and_release() {
        let fs = MockFileSystem::new();
        let lock = lock_on(&fs);

        let guard = match lock.try_acquire() {
            LockAttempt::Acquired(g) => g,
            other => panic!("expected Acquired, got {other:?}"),
        };
        assert!(fs.is_file(Path::new(LOCK)));
        assert!(matches!(lock.try_acquire(), LockAttempt::Held));

        drop(guard);
        assert!(!fs.exists(Path::new(LOCK)));
        assert!(matches!(lock.try_acquire(), LockAttempt::Acquired(_)));
    }

    #[test]
    fn stale_lock_is_replaced() {
        let fs = MockFileSystem::new();
        let lock = lock_on(&fs);
        fs.add_file(LOCK, "4242\n");
        fs.backdate(LOCK, Duration::from_secs(600));

        match lock.try_acquire() {
            LockAttempt::Acquired(guard) => {
                let holder = fs.read_to_string(Path::new(LOCK)).unwrap();
                assert_eq!(holder.trim(), guard.token());
                assert!(guard.token().starts_with(&format!("{} ", std::process::id())));
            }
            other => panic!("expected Acquired, got {other:?}"),
        }
    }

    #[test]
    fn fresh_foreign_lock_is_respected() {
        let fs = MockFileSystem::new();
        let lock = lock_on(&fs);
        fs.add_file(LOCK, "4242\n");

        assert!(matches!(lock.try_acquire(), LockAttempt::Held));
        assert_eq!(fs.read_to_string(Path::new(LOCK)).unwrap(), "4242\n");
    }

    #[test]
    fn overrun_guard_does_not_release_successor_lock() {
        let fs = MockFileSystem::new();
        let lock = lock_on(&fs);

        let first = match lock.try_acquire() {
            LockAttempt::Acquired(g) => g,
            other => panic!("expected Acquired, got {other:?}"),
        };
        // The first deploy overruns the stale limit and a second run takes over.
        fs.backdate(LOCK, Duration::from_secs(600));
        let second = match lock.try_acquire() {
            LockAttempt::Acquired(g) => g,
            other => panic!("expected takeover, got {other:?}"),
        };
        assert_ne!(first.token(), second.token());

        drop(first);
        assert_eq!(
            fs.read_to_string(Path::new(LOCK)).unwrap().trim(),
            second.token()
        );
        assert!(matches!(lock.try_acquire(), LockAttempt::Held));

        drop(second);
        assert!(!fs.exists(Path::new(LOCK)));
    }

    #[test]
    fn tokens_are_unique_per_acquisition() {
        assert_ne!(acquisition_token(), acquisition_token());
    }
}
