// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - `model.rs`: the TOML-backed data model and command-line overrides.
//! - `loader.rs`: reading the file through the [`FileSystem`](crate::fs::FileSystem) abstraction.
//! - `validate.rs`: `RawConfigFile` -> `ConfigFile` conversion.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    default_config_candidates, default_config_path, load_and_validate, load_and_validate_from,
    load_from_path, CONFIG_FILE_NAME,
};
pub use model::{
    ConfigFile, ConfigOverrides, DeploySettings, LockSection, RawConfigFile, RawDeploySection,
};
