// src/commands/mod.rs

//! Command lines issued to the external collaborators.
//!
//! Nothing here runs a process; these are pure constructors so that the
//! reconciler, the dry-run printer and the tests all agree on the exact
//! argument vectors.

use std::fmt;

pub mod docker;
pub mod git;

/// A program plus its arguments. Executed directly, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Build from a `[program, arg, ...]` prefix such as `["docker", "compose"]`.
    ///
    /// An empty prefix yields an empty program, which fails at spawn time; the
    /// config validator prevents that in practice.
    pub fn from_prefix(prefix: &[String]) -> Self {
        let mut parts = prefix.iter();
        let program = parts.next().cloned().unwrap_or_default();
        Self {
            program,
            args: parts.cloned().collect(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_and_quotes() {
        let cmd = CommandLine::new("git").args(["commit", "-m", "two words"]);
        assert_eq!(cmd.to_string(), r#"git commit -m "two words""#);
    }

    #[test]
    fn from_prefix_splits_program() {
        let cmd = CommandLine::from_prefix(&["docker".to_string(), "compose".to_string()]).arg("up");
        assert_eq!(cmd.program, "docker");
        assert_eq!(cmd.args, vec!["compose", "up"]);
    }
}
