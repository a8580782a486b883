#![allow(dead_code)]

use std::path::PathBuf;

use autodeploy::commands::{docker, git, CommandLine};
use autodeploy::config::{ConfigFile, DeploySettings, RawConfigFile};
use autodeploy::types::OutputMode;

use crate::fake_runner::FakeRunner;

pub const CONTAINER: &str = "app_prod";

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.deploy.container = Some(CONTAINER.to_string());
        Self { config }
    }

    pub fn branch(mut self, branch: &str) -> Self {
        self.config.deploy.branch = branch.to_string();
        self
    }

    pub fn remote(mut self, remote: &str) -> Self {
        self.config.deploy.remote = remote.to_string();
        self
    }

    pub fn compose_file(mut self, path: &str) -> Self {
        self.config.deploy.compose_file = Some(PathBuf::from(path));
        self
    }

    pub fn compose_command(mut self, cmd: &str) -> Self {
        self.config.deploy.compose_command = cmd.to_string();
        self
    }

    pub fn docker_command(mut self, cmd: &str) -> Self {
        self.config.deploy.docker_command = cmd.to_string();
        self
    }

    pub fn project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.deploy.project_dir = Some(dir.into());
        self
    }

    pub fn output(mut self, mode: OutputMode) -> Self {
        self.config.deploy.output = mode;
        self
    }

    pub fn without_lock(mut self) -> Self {
        self.config.lock.enabled = false;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The exact command lines a reconciler built from `settings` will issue.
#[derive(Debug, Clone)]
pub struct Commands {
    pub liveness: CommandLine,
    pub started_at: CommandLine,
    pub start: CommandLine,
    pub fetch: CommandLine,
    pub local: CommandLine,
    pub remote: CommandLine,
    pub pull: CommandLine,
    pub rebuild: CommandLine,
    pub prune: CommandLine,
}

impl Commands {
    pub fn for_settings(s: &DeploySettings) -> Self {
        Self {
            liveness: docker::inspect_running(&s.docker_command, &s.container),
            started_at: docker::inspect_started_at(&s.docker_command, &s.container),
            start: docker::compose_up(&s.compose_command, s.compose_file.as_deref(), false),
            fetch: git::fetch(&s.remote),
            local: git::rev_parse(s.local_ref()),
            remote: git::rev_parse(&s.remote_ref()),
            pull: git::pull(&s.remote, &s.branch),
            rebuild: docker::compose_up(&s.compose_command, s.compose_file.as_deref(), true),
            prune: docker::image_prune(&s.docker_command),
        }
    }
}

/// Scripts a [`FakeRunner`] for one reconciliation scenario.
///
/// Defaults: container running, fetch/pull/start/rebuild/prune succeed,
/// both revisions `abc123`.
pub struct Scenario {
    commands: Commands,
    liveness: Vec<Option<&'static str>>,
    local: Option<&'static str>,
    remote: Option<&'static str>,
    fetch_ok: bool,
    pull_ok: bool,
    start_ok: bool,
    rebuild_ok: bool,
    prune_ok: bool,
}

impl Scenario {
    pub fn new(settings: &DeploySettings) -> Self {
        Self {
            commands: Commands::for_settings(settings),
            liveness: vec![Some("true")],
            local: Some("abc123"),
            remote: Some("abc123"),
            fetch_ok: true,
            pull_ok: true,
            start_ok: true,
            rebuild_ok: true,
            prune_ok: true,
        }
    }

    /// Successive answers to the liveness query (`"true"`, `"false"`, or
    /// `None` for a failed query). The last one repeats.
    pub fn liveness(mut self, answers: &[Option<&'static str>]) -> Self {
        self.liveness = answers.to_vec();
        self
    }

    pub fn stopped(self) -> Self {
        self.liveness(&[Some("false")])
    }

    pub fn revisions(mut self, local: Option<&'static str>, remote: Option<&'static str>) -> Self {
        self.local = local;
        self.remote = remote;
        self
    }

    pub fn fetch_fails(mut self) -> Self {
        self.fetch_ok = false;
        self
    }

    pub fn pull_fails(mut self) -> Self {
        self.pull_ok = false;
        self
    }

    pub fn start_fails(mut self) -> Self {
        self.start_ok = false;
        self
    }

    pub fn rebuild_fails(mut self) -> Self {
        self.rebuild_ok = false;
        self
    }

    pub fn prune_fails(mut self) -> Self {
        self.prune_ok = false;
        self
    }

    pub fn commands(&self) -> &Commands {
        &self.commands
    }

    pub fn runner(self) -> FakeRunner {
        let c = self.commands;
        let ok = |b: bool| if b { Some("") } else { None };

        let mut runner = FakeRunner::new();
        for answer in self.liveness {
            runner = runner.on(c.liveness.clone(), answer);
        }
        runner
            .on(c.started_at, Some("2026-10-19T12:00:00Z"))
            .on(c.start, ok(self.start_ok))
            .on(c.fetch, ok(self.fetch_ok))
            .on(c.local, self.local)
            .on(c.remote, self.remote)
            .on(c.pull, ok(self.pull_ok))
            .on(c.rebuild, ok(self.rebuild_ok))
            .on(c.prune, ok(self.prune_ok))
    }
}
