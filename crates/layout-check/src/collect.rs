//! Gathers the full storage-layout snapshot of one revision.

use crate::{
    artifacts::{self, SkipReason},
    forge::Forge,
    git::Git,
    layout::{self, StorageRecord},
};
use eyre::Result;
use std::collections::BTreeMap;

/// All storage layouts of one revision, keyed by contract identifier.
///
/// Contracts without storage variables (and contracts whose inspection
/// failed) are absent.
pub type LayoutSnapshot = BTreeMap<String, Vec<StorageRecord>>;

/// Checks out `rev`, rebuilds the project, and gathers the storage layout of
/// every matching contract.
///
/// Failures of individual inspections are recorded and skipped; a failing
/// checkout or build aborts the run with the collaborator's error.
pub fn collect_layouts(
    git: &Git<'_>,
    forge: &Forge<'_>,
    rev: &str,
    include_paths: &[String],
) -> Result<LayoutSnapshot> {
    git.checkout(rev)?;
    // Submodules have to match the revision; best-effort, since projects
    // without any are common.
    if let Err(err) = git.submodule_update() {
        debug!(%err, "submodule update failed");
    }

    forge.clean()?;
    forge.build()?;

    let resolved = artifacts::resolve_contract_ids(&forge.out_dir(), include_paths);
    let total = resolved.ids.len();
    let mut snapshot = LayoutSnapshot::new();
    let mut skipped: Vec<(String, SkipReason)> = Vec::new();

    for (idx, ident) in resolved.ids.iter().enumerate() {
        eprintln!("      [{}/{total}] {ident}", idx + 1);
        let raw = match forge.inspect_storage(ident) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(%ident, %err, "inspect failed");
                skipped.push((ident.clone(), SkipReason::InspectFailed));
                continue;
            }
        };
        if raw.is_empty() {
            skipped.push((ident.clone(), SkipReason::NoStorage));
            continue;
        }
        match layout::parse_layout(&raw) {
            Some(parsed) if !parsed.records.is_empty() => {
                trace!(%ident, format = ?parsed.format, records = parsed.records.len(), "parsed");
                snapshot.insert(ident.clone(), parsed.records);
            }
            Some(_) => skipped.push((ident.clone(), SkipReason::NoStorage)),
            None => skipped.push((ident.clone(), SkipReason::Unparseable)),
        }
    }

    if !skipped.is_empty() || !resolved.skipped.is_empty() {
        let failures =
            skipped.iter().filter(|(_, reason)| *reason == SkipReason::InspectFailed).count();
        eprintln!(
            "      skipped {} of {total} contracts ({failures} inspect failures, {} unresolved artifacts)",
            skipped.len(),
            resolved.skipped.len(),
        );
        for (ident, reason) in &skipped {
            debug!(%ident, %reason, "contract not in snapshot");
        }
    }

    Ok(snapshot)
}
