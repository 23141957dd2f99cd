//! # layout-check
//!
//! Diffs the storage layouts of a Foundry project between two git revisions,
//! flagging storage variables an upgrade would add, remove or relocate.
//!
//! The tool checks out each revision in turn, rebuilds the project with
//! `forge`, gathers every contract's layout via `forge inspect`, and prints a
//! color-coded diff showing only the changes.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub mod artifacts;
pub mod cmd;
pub mod collect;
pub mod diff;
pub mod forge;
pub mod git;
pub mod handler;
pub mod layout;
pub mod opts;
pub mod report;
pub mod utils;

use clap::Parser;
use eyre::Result;

/// Parses the CLI arguments and runs the selected command.
pub fn run() -> Result<()> {
    let args = opts::LayoutCheck::parse();
    match args.cmd {
        opts::LayoutCheckSubcommand::Diff(cmd) => cmd.run(),
    }
}
