// src/commands/docker.rs

use std::path::Path;

use super::CommandLine;

pub fn inspect_running(docker: &str, container: &str) -> CommandLine {
    CommandLine::new(docker).args(["inspect", "-f", "{{.State.Running}}", container])
}

pub fn inspect_started_at(docker: &str, container: &str) -> CommandLine {
    CommandLine::new(docker).args(["inspect", "-f", "{{.State.StartedAt}}", container])
}

/// `<compose> [-f file] up -d [--build]`
pub fn compose_up(compose: &[String], compose_file: Option<&Path>, force_build: bool) -> CommandLine {
    let mut cmd = CommandLine::from_prefix(compose);
    if let Some(file) = compose_file {
        cmd = cmd.arg("-f").arg(file.to_string_lossy());
    }
    cmd = cmd.args(["up", "-d"]);
    if force_build {
        cmd = cmd.arg("--build");
    }
    cmd
}

/// Remove dangling images left behind by rebuilds.
pub fn image_prune(docker: &str) -> CommandLine {
    CommandLine::new(docker).args(["image", "prune", "-f"])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compose() -> Vec<String> {
        vec!["docker".to_string(), "compose".to_string()]
    }

    #[test]
    fn compose_up_without_file() {
        assert_eq!(
            compose_up(&compose(), None, true).to_string(),
            "docker compose up -d --build"
        );
        assert_eq!(compose_up(&compose(), None, false).to_string(), "docker compose up -d");
    }

    #[test]
    fn compose_up_with_file_puts_flag_before_subcommand() {
        let cmd = compose_up(&compose(), Some(Path::new("deploy/prod.yml")), false);
        assert_eq!(cmd.args, vec!["compose", "-f", "deploy/prod.yml", "up", "-d"]);
    }

    #[test]
    fn inspect_queries() {
        assert_eq!(
            inspect_running("docker", "app").args,
            vec!["inspect", "-f", "{{.State.Running}}", "app"]
        );
        assert_eq!(
            inspect_started_at("podman", "app").program,
            "podman"
        );
        assert_eq!(image_prune("docker").to_string(), "docker image prune -f");
    }
}
