// src/commands/git.rs

use super::CommandLine;

/// Update remote-tracking refs without touching the working copy.
pub fn fetch(remote: &str) -> CommandLine {
    CommandLine::new("git").args(["fetch", remote])
}

/// Resolve a symbolic ref (`main`, `origin/main`) to a commit id.
pub fn rev_parse(reference: &str) -> CommandLine {
    CommandLine::new("git").args(["rev-parse", reference])
}

/// Fast-forward the working copy to the remote branch tip.
///
/// `--ff-only` makes git refuse instead of creating a merge commit when the
/// checkout has diverged.
pub fn pull(remote: &str, branch: &str) -> CommandLine {
    CommandLine::new("git").args(["pull", "--ff-only", remote, branch])
}
