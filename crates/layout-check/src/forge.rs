//! Wrapper around the project's `forge` executable.
//!
//! Building and inspecting are external collaborators: this tool never
//! compiles contracts itself.

use crate::utils::CommandUtils;
use eyre::Result;
use std::{
    path::{Path, PathBuf},
    process::Command,
};

/// Handle to the `forge` binary, run from the project root.
#[derive(Clone, Copy, Debug)]
pub struct Forge<'a> {
    pub root: &'a Path,
}

impl<'a> Forge<'a> {
    pub fn new(root: &'a Path) -> Self {
        Self { root }
    }

    fn cmd(self) -> Command {
        let mut cmd = Command::new("forge");
        cmd.current_dir(self.root);
        cmd
    }

    /// Removes the build artifacts and cache.
    pub fn clean(self) -> Result<()> {
        self.cmd().args(["clean", "--silent"]).exec().map(drop)
    }

    /// Compiles the project, skipping test and script compilation units.
    pub fn build(self) -> Result<()> {
        self.cmd().args(["build", "--silent", "--skip", "test", "--skip", "script"]).exec().map(drop)
    }

    /// Asks forge for a contract's storage layout.
    ///
    /// `--json` is accepted by every supported version, but the printed shape
    /// is not stable across them; see [`crate::layout::parse_layout`].
    pub fn inspect_storage(self, ident: &str) -> Result<String> {
        self.cmd().args(["inspect", ident, "storageLayout", "--json"]).get_stdout_lossy()
    }

    /// The directory `forge build` writes artifact metadata to.
    pub fn out_dir(self) -> PathBuf {
        self.root.join("out")
    }
}
