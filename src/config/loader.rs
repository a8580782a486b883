// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, ConfigOverrides, RawConfigFile};
use crate::errors::{AutodeployError, Result};
use crate::fs::FileSystem;

pub const CONFIG_FILE_NAME: &str = "Autodeploy.toml";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs.read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load, apply command-line overrides, validate.
///
/// - An explicit `path` must exist.
/// - Without one, the first existing file among [`default_config_candidates`]
///   is used; if none exists the built-in defaults are the starting point and
///   the overrides must at least supply the container name.
pub fn load_and_validate(
    fs: &dyn FileSystem,
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<ConfigFile> {
    let candidates = match path {
        Some(_) => Vec::new(),
        None => default_config_candidates(overrides)?,
    };
    load_and_validate_from(fs, path, &candidates, overrides)
}

/// Same as [`load_and_validate`] with an explicit search list for the
/// implicit config file.
pub fn load_and_validate_from(
    fs: &dyn FileSystem,
    path: Option<&Path>,
    candidates: &[PathBuf],
    overrides: &ConfigOverrides,
) -> Result<ConfigFile> {
    let mut raw = match path {
        Some(path) => {
            if !fs.is_file(path) {
                return Err(AutodeployError::ConfigError(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            load_from_path(fs, path)?
        }
        None => match candidates.iter().find(|c| fs.is_file(c)) {
            Some(found) => {
                debug!(path = %found.display(), "using config file");
                load_from_path(fs, found)?
            }
            None => {
                debug!(searched = candidates.len(), "no config file found; using defaults");
                RawConfigFile::default()
            }
        },
    };

    raw.apply_overrides(overrides);
    ConfigFile::try_from(raw)
}

/// `Autodeploy.toml` relative to the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Where an implicit config file is looked for, in order:
///
/// 1. the current working directory
/// 2. the directory containing the executable
/// 3. the `--project-dir` given on the command line, if any
///
/// A scheduler usually starts the binary from an unrelated working directory,
/// so the install directory has to be searched as well.
pub fn default_config_candidates(overrides: &ConfigOverrides) -> Result<Vec<PathBuf>> {
    let mut candidates = vec![default_config_path()];
    let mut push = |path: PathBuf| {
        if !candidates.contains(&path) {
            candidates.push(path);
        }
    };

    push(crate::executable_dir()?.join(CONFIG_FILE_NAME));
    if let Some(ref dir) = overrides.project_dir {
        push(dir.join(CONFIG_FILE_NAME));
    }

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn with_container(name: &str) -> String {
        format!("[deploy]\ncontainer = \"{name}\"\n")
    }

    #[test]
    fn first_existing_candidate_wins() {
        let fs = MockFileSystem::new();
        fs.add_file("/opt/autodeploy/Autodeploy.toml", with_container("installed"));
        fs.add_file("/srv/app/Autodeploy.toml", with_container("project"));
        let candidates = vec![
            PathBuf::from("/home/ops/Autodeploy.toml"),
            PathBuf::from("/opt/autodeploy/Autodeploy.toml"),
            PathBuf::from("/srv/app/Autodeploy.toml"),
        ];

        let cfg =
            load_and_validate_from(&fs, None, &candidates, &ConfigOverrides::default()).unwrap();
        assert_eq!(cfg.deploy.container, "installed");
    }

    #[test]
    fn explicit_path_ignores_candidates() {
        let fs = MockFileSystem::new();
        fs.add_file("/opt/autodeploy/Autodeploy.toml", with_container("installed"));
        let candidates = vec![PathBuf::from("/opt/autodeploy/Autodeploy.toml")];

        let result = load_and_validate_from(
            &fs,
            Some(Path::new("/etc/missing.toml")),
            &candidates,
            &ConfigOverrides::default(),
        );
        assert!(matches!(result, Err(AutodeployError::ConfigError(_))));
    }

    #[test]
    fn candidates_cover_cwd_install_dir_and_project_dir() {
        let overrides = ConfigOverrides {
            project_dir: Some(PathBuf::from("/srv/app")),
            ..ConfigOverrides::default()
        };
        let exe_dir = std::env::current_exe().unwrap().parent().unwrap().to_path_buf();

        let candidates = default_config_candidates(&overrides).unwrap();
        assert_eq!(
            candidates,
            vec![
                PathBuf::from(CONFIG_FILE_NAME),
                exe_dir.join(CONFIG_FILE_NAME),
                PathBuf::from("/srv/app").join(CONFIG_FILE_NAME),
            ]
        );
    }
}
