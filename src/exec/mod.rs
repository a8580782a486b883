// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] provides the `ProcessRunner` trait and the production
//!   `RealProcessRunner`, which tests replace with a scripted fake.
//! - [`process`] runs one command with `tokio::process::Command`, either
//!   capturing stdout or streaming it to our own stdout.

pub mod backend;
pub mod process;

pub use backend::{CommandResult, ProcessRunner, RealProcessRunner};
pub use process::run_command;
