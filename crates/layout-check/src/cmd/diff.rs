use crate::{
    collect::{self, LayoutSnapshot},
    diff::diff_layouts,
    forge::Forge,
    git::Git,
    report,
};
use clap::{Parser, ValueHint};
use eyre::Result;
use itertools::Itertools;
use std::path::{Path, PathBuf};

/// CLI arguments for `layout-check diff`.
#[derive(Clone, Debug, Parser)]
pub struct DiffArgs {
    /// The older revision to compare. Any git ref: commit, tag or branch.
    old: String,

    /// The newer revision to compare.
    new: String,

    /// Source-file prefix(es) to include, e.g. `src/` or `contracts/MyLib.sol`.
    ///
    /// If omitted, every contract in the project is inspected.
    #[arg(long, short = 'p', value_name = "PREFIX")]
    path: Vec<String>,

    /// Report relocated variables as a removal plus an addition instead of a
    /// move.
    #[arg(long)]
    no_moves: bool,

    /// The project's root path.
    ///
    /// By default the root of the enclosing git repository.
    #[arg(long, value_hint = ValueHint::DirPath, value_name = "PATH")]
    root: Option<PathBuf>,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let root = match &self.root {
            Some(root) => root.clone(),
            None => Git::root_of(Path::new("."))?,
        };
        let git = Git::new(&root);
        let forge = Forge::new(&root);

        trace!(args = ?self, root = %root.display(), "running layout-check diff");

        if git.is_dirty()? {
            eyre::bail!("the working tree has uncommitted changes; commit or stash them first");
        }

        // Both collections check out the shared working tree, so they run
        // strictly one after the other, and the tree is put back on the
        // starting revision afterwards no matter which of them failed.
        let original = git.head_rev()?;
        let collected = self.collect_both(&git, &forge);
        let restored = git.checkout(&original);
        if let Err(err) = git.submodule_update() {
            debug!(%err, "submodule update failed while restoring");
        }
        let (old_snapshot, new_snapshot) = collected?;
        restored?;

        let mut changed = 0usize;
        for ident in old_snapshot.keys().merge(new_snapshot.keys()).dedup() {
            let old = old_snapshot.get(ident).map_or(&[][..], Vec::as_slice);
            let new = new_snapshot.get(ident).map_or(&[][..], Vec::as_slice);
            let diff = diff_layouts(old, new, !self.no_moves);
            if let Some(rendered) = report::render_diff(ident, &diff) {
                print!("{rendered}");
                changed += 1;
            }
        }

        if changed == 0 {
            println!("No storage layout changes between {} and {}.", self.old, self.new);
        } else {
            println!("\nDone.");
        }
        Ok(())
    }

    fn collect_both(
        &self,
        git: &Git<'_>,
        forge: &Forge<'_>,
    ) -> Result<(LayoutSnapshot, LayoutSnapshot)> {
        eprintln!("Collecting layouts at {} ...", self.old);
        let old = collect::collect_layouts(git, forge, &self.old, &self.path)?;
        eprintln!("Collecting layouts at {} ...", self.new);
        let new = collect::collect_layouts(git, forge, &self.new, &self.path)?;
        Ok((old, new))
    }
}
