//! Renders a layout diff as colorized terminal output.

use crate::{diff::LayoutDiff, layout::StorageRecord};
use std::fmt::Write;
use yansi::Paint;

/// Renders one contract's diff, or `None` when the layouts match.
///
/// Moves come first (yellow), then removals (red), then additions (green).
/// The header shows only the contract name after the final `:` of the
/// identifier.
pub fn render_diff(ident: &str, diff: &LayoutDiff) -> Option<String> {
    if diff.is_empty() {
        return None;
    }

    let name = ident.rsplit(':').next().unwrap_or(ident);
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", format!("Contract: {name}").cyan().bold());

    for (old, new) in &diff.moved {
        let line = format!(
            "↷ {} : {}  {}/{} → {}/{}",
            old.label, old.ty, old.slot, old.offset, new.slot, new.offset
        );
        let _ = writeln!(out, "{}", line.yellow());
    }
    for record in &diff.removed {
        let _ = writeln!(out, "{}", format!("− {}", fmt_record(record)).red());
    }
    for record in &diff.added {
        let _ = writeln!(out, "{}", format!("+ {}", fmt_record(record)).green());
    }

    Some(out)
}

fn fmt_record(record: &StorageRecord) -> String {
    format!(
        "[slot {:>3} | offset {:>2}] {} : {}",
        record.slot, record.offset, record.label, record.ty
    )
}
