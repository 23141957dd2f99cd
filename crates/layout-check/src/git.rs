//! Thin wrapper for running `git` against the project's working tree.

use crate::utils::CommandUtils;
use eyre::Result;
use std::{
    path::{Path, PathBuf},
    process::Command,
};

/// Helper for executing git commands from the repository root.
#[derive(Clone, Copy, Debug)]
pub struct Git<'a> {
    pub root: &'a Path,
}

impl<'a> Git<'a> {
    pub fn new(root: &'a Path) -> Self {
        Self { root }
    }

    /// Returns the root of the git repository enclosing `relative_to`.
    pub fn root_of(relative_to: &Path) -> Result<PathBuf> {
        let mut cmd = Command::new("git");
        cmd.current_dir(relative_to).args(["rev-parse", "--show-toplevel"]);
        Ok(PathBuf::from(cmd.get_stdout_lossy()?))
    }

    fn cmd(self) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(self.root);
        cmd
    }

    /// The revision the working tree is currently checked out at.
    pub fn head_rev(self) -> Result<String> {
        self.cmd().args(["rev-parse", "HEAD"]).get_stdout_lossy()
    }

    /// Whether the tree has uncommitted changes, untracked files included.
    pub fn is_dirty(self) -> Result<bool> {
        Ok(!self.cmd().args(["status", "--porcelain"]).get_stdout_lossy()?.is_empty())
    }

    /// Checks out `rev`. An unknown ref or a conflicting tree fails loudly.
    pub fn checkout(self, rev: &str) -> Result<()> {
        self.cmd().args(["checkout", rev]).exec().map(drop)
    }

    /// Syncs submodules to the checked out revision. Exits cleanly for a
    /// project without any.
    pub fn submodule_update(self) -> Result<()> {
        self.cmd().args(["submodule", "update", "--init", "--recursive"]).exec().map(drop)
    }
}
