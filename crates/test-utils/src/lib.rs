//! Test support for the reconciliation engine.
//!
//! - [`fake_runner::FakeRunner`] stands in for git and docker: each command
//!   line gets a scripted answer (`Some(stdout)` or `None` for failure), and
//!   every call is recorded in a shared [`fake_runner::CallLog`].
//! - [`builders::Scenario`] scripts a whole pass (container stopped, fetch
//!   fails, revisions differ) on top of the command lines that
//!   [`builders::Commands`] derives from a `DeploySettings`.
//! - [`builders::ConfigFileBuilder`] produces validated settings without a
//!   TOML file.

pub mod builders;
pub mod fake_runner;

pub use builders::{Commands, ConfigFileBuilder, Scenario};
pub use fake_runner::{CallLog, FakeRunner};

use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Route engine logs to the test harness.
///
/// Output is captured per test and shown only when that test fails.
/// `RUST_LOG=autodeploy=debug` adds the lock acquire and release events.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Guard against a pass that never finishes, e.g. a fake answer left
/// unscripted in a way that makes the engine wait.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("reconcile pass did not finish within 5 seconds")
}
