// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Only configuration problems surface as errors. Failures of the external
//! tools (git, docker) are folded into absent results by the runner and never
//! reach this type.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutodeployError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Project directory does not exist: {}", .0.display())]
    ProjectDirMissing(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AutodeployError>;
