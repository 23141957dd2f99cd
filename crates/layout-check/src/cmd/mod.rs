//! Subcommand implementations.

pub mod diff;
