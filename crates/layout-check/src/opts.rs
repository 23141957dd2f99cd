use crate::cmd::diff::DiffArgs;
use clap::{Parser, Subcommand};

/// Diff the storage layouts of a Foundry project between two git revisions.
#[derive(Parser)]
#[command(name = "layout-check", version, next_display_order = None)]
pub struct LayoutCheck {
    #[command(subcommand)]
    pub cmd: LayoutCheckSubcommand,
}

#[derive(Subcommand)]
pub enum LayoutCheckSubcommand {
    /// Compare the storage layouts of all contracts at two git revisions.
    ///
    /// Prints only the differences: variables added, removed or relocated.
    Diff(DiffArgs),
}
