//! Resolves the contract identifiers to inspect from Foundry's artifact
//! directory.

use path_slash::PathExt as _;
use serde::Deserialize;
use std::{
    collections::HashSet,
    ffi::OsStr,
    fmt, fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Path prefixes excluded from inspection unless explicitly requested via
/// `--path`.
const IGNORE_PREFIXES: &[&str] = &["lib/", "test/", "script/"];

/// Why an artifact file or contract was dropped from a run.
///
/// None of these abort the run; they are collected so the aggregate can be
/// reported instead of silently discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The artifact file could not be read or parsed.
    Unreadable,
    /// Neither a source path nor a contract name could be derived.
    NoIdentifier,
    /// `forge inspect` failed for the contract.
    InspectFailed,
    /// The inspector's output matched neither supported shape.
    Unparseable,
    /// The layout parsed but contains no storage variables.
    NoStorage,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unreadable => "unreadable artifact",
            Self::NoIdentifier => "no identifier",
            Self::InspectFailed => "inspect failed",
            Self::Unparseable => "unparseable layout",
            Self::NoStorage => "no storage variables",
        };
        f.write_str(s)
    }
}

/// The identifiers resolved from one artifact directory, along with the files
/// that could not be resolved.
#[derive(Clone, Debug, Default)]
pub struct ResolvedArtifacts {
    /// Deduplicated identifiers in first-seen order.
    pub ids: Vec<String>,
    pub skipped: Vec<(PathBuf, SkipReason)>,
}

/// The artifact fields relevant for identification. Anything else in the
/// document is ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactMeta {
    source_path: Option<String>,
    source_name: Option<String>,
    contract_name: Option<String>,
    metadata: Option<serde_json::Value>,
}

/// Scans `out_dir` for Foundry artifacts and resolves the identifiers accepted
/// by `forge inspect`, in the canonical `<source-path>:<Contract>` form.
///
/// Identification tries, in order: the `settings.compilationTarget` entry of
/// the embedded compiler metadata, the legacy `sourcePath`/`sourceName` and
/// `contractName` fields, and finally the artifact's own location under
/// `out_dir`. Debug and build-info blobs are never considered. Contracts under
/// `lib/`, `test/` and `script/` are excluded by default; a non-empty
/// `include_paths` replaces that rule and retains exactly the identifiers
/// matching one of the given prefixes.
///
/// A missing `out_dir` yields an empty result.
pub fn resolve_contract_ids(out_dir: &Path, include_paths: &[String]) -> ResolvedArtifacts {
    let mut seen = HashSet::new();
    let mut resolved = ResolvedArtifacts::default();

    for entry in WalkDir::new(out_dir).sort_by_file_name().into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension() != Some(OsStr::new("json")) {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if file_name.ends_with(".dbg.json")
            || path.components().any(|c| c.as_os_str() == "build-info")
        {
            continue;
        }

        match resolve_one(out_dir, path) {
            Ok(ident) => {
                if !keep(&ident, include_paths) {
                    trace!(%ident, "filtered out");
                    continue;
                }
                if seen.insert(ident.clone()) {
                    resolved.ids.push(ident);
                }
            }
            Err(reason) => {
                debug!(path = %path.display(), %reason, "skipping artifact");
                resolved.skipped.push((path.to_path_buf(), reason));
            }
        }
    }

    resolved
}

/// Derives the `<source>:<name>` identifier for a single artifact file.
fn resolve_one(out_dir: &Path, path: &Path) -> Result<String, SkipReason> {
    let raw = fs::read_to_string(path).map_err(|_| SkipReason::Unreadable)?;
    let meta: ArtifactMeta = serde_json::from_str(&raw).map_err(|_| SkipReason::Unreadable)?;

    // Legacy top-level fields.
    let mut source = meta.source_path.or(meta.source_name);
    let mut name = meta.contract_name;

    // The compiler metadata's compilation target is authoritative when present.
    if let Some((target_source, target_name)) = compilation_target(meta.metadata.as_ref()) {
        source = Some(target_source);
        name = Some(target_name);
    }

    // Fall back to the artifact's location: `out/<Source>.sol/<Contract>.json`.
    if source.is_none()
        && let Some(parent) = path.parent()
        && parent.file_name().is_some_and(|n| n.to_string_lossy().ends_with(".sol"))
    {
        source = parent.strip_prefix(out_dir).ok().map(|p| p.to_slash_lossy().into_owned());
    }
    if name.is_none() {
        name = path.file_stem().map(|s| s.to_string_lossy().into_owned());
    }

    match (source, name) {
        (Some(source), Some(name)) => Ok(format!("{source}:{name}")),
        _ => Err(SkipReason::NoIdentifier),
    }
}

/// Extracts the single `(source, name)` entry of the compiler metadata's
/// compilation target. The metadata blob is embedded either as a JSON string
/// or inline as an object.
fn compilation_target(metadata: Option<&serde_json::Value>) -> Option<(String, String)> {
    let mut metadata = metadata?;
    let parsed;
    if let serde_json::Value::String(s) = metadata {
        parsed = serde_json::from_str::<serde_json::Value>(s).ok()?;
        metadata = &parsed;
    }
    let target = metadata.get("settings")?.get("compilationTarget")?.as_object()?;
    let (source, name) = target.iter().next()?;
    Some((source.clone(), name.as_str()?.to_string()))
}

fn keep(ident: &str, include_paths: &[String]) -> bool {
    if !include_paths.is_empty() {
        return include_paths.iter().any(|prefix| ident.starts_with(prefix.as_str()));
    }
    !IGNORE_PREFIXES.iter().any(|prefix| ident.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_artifact(out: &Path, rel: &str, contents: &str) {
        let path = out.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn resolves_compilation_target() {
        let out = tempdir().unwrap();
        write_artifact(
            out.path(),
            "Foo.sol/Foo.json",
            r#"{"abi":[],"metadata":{"settings":{"compilationTarget":{"src/Foo.sol":"Foo"}}}}"#,
        );
        let resolved = resolve_contract_ids(out.path(), &[]);
        assert_eq!(resolved.ids, ["src/Foo.sol:Foo"]);
        assert!(resolved.skipped.is_empty());
    }

    #[test]
    fn resolves_metadata_embedded_as_string() {
        let out = tempdir().unwrap();
        write_artifact(
            out.path(),
            "Foo.sol/Foo.json",
            r#"{"metadata":"{\"settings\":{\"compilationTarget\":{\"src/Foo.sol\":\"Foo\"}}}"}"#,
        );
        let resolved = resolve_contract_ids(out.path(), &[]);
        assert_eq!(resolved.ids, ["src/Foo.sol:Foo"]);
    }

    #[test]
    fn compilation_target_beats_legacy_fields() {
        let out = tempdir().unwrap();
        write_artifact(
            out.path(),
            "Foo.sol/Foo.json",
            r#"{"sourcePath":"old/Foo.sol","contractName":"Old",
                "metadata":{"settings":{"compilationTarget":{"src/Foo.sol":"Foo"}}}}"#,
        );
        let resolved = resolve_contract_ids(out.path(), &[]);
        assert_eq!(resolved.ids, ["src/Foo.sol:Foo"]);
    }

    #[test]
    fn resolves_legacy_fields() {
        let out = tempdir().unwrap();
        write_artifact(
            out.path(),
            "Bar.sol/Bar.json",
            r#"{"sourceName":"src/Bar.sol","contractName":"Bar"}"#,
        );
        let resolved = resolve_contract_ids(out.path(), &[]);
        assert_eq!(resolved.ids, ["src/Bar.sol:Bar"]);
    }

    #[test]
    fn derives_identifier_from_artifact_location() {
        let out = tempdir().unwrap();
        write_artifact(out.path(), "Baz.sol/Baz.json", "{}");
        let resolved = resolve_contract_ids(out.path(), &[]);
        assert_eq!(resolved.ids, ["Baz.sol:Baz"]);
    }

    #[test]
    fn skips_debug_and_build_info_blobs() {
        let out = tempdir().unwrap();
        let artifact = r#"{"sourceName":"src/Foo.sol","contractName":"Foo"}"#;
        write_artifact(out.path(), "Foo.sol/Foo.dbg.json", artifact);
        write_artifact(out.path(), "build-info/a94f.json", artifact);
        let resolved = resolve_contract_ids(out.path(), &[]);
        assert!(resolved.ids.is_empty());
        assert!(resolved.skipped.is_empty());
    }

    #[test]
    fn records_malformed_artifacts() {
        let out = tempdir().unwrap();
        write_artifact(out.path(), "Foo.sol/Foo.json", "not json at all");
        let resolved = resolve_contract_ids(out.path(), &[]);
        assert!(resolved.ids.is_empty());
        assert_eq!(resolved.skipped.len(), 1);
        assert_eq!(resolved.skipped[0].1, SkipReason::Unreadable);
    }

    #[test]
    fn ignores_dependency_test_and_script_contracts() {
        let out = tempdir().unwrap();
        write_artifact(
            out.path(),
            "Foo.t.sol/FooTest.json",
            r#"{"sourceName":"test/Foo.t.sol","contractName":"FooTest"}"#,
        );
        write_artifact(
            out.path(),
            "console.sol/console.json",
            r#"{"sourceName":"lib/forge-std/src/console.sol","contractName":"console"}"#,
        );
        let resolved = resolve_contract_ids(out.path(), &[]);
        assert!(resolved.ids.is_empty());

        // An explicit include filter overrides the exclusion.
        let resolved = resolve_contract_ids(out.path(), &["test/".to_string()]);
        assert_eq!(resolved.ids, ["test/Foo.t.sol:FooTest"]);
    }

    #[test]
    fn include_filter_retains_only_matches() {
        let out = tempdir().unwrap();
        write_artifact(
            out.path(),
            "Foo.sol/Foo.json",
            r#"{"sourceName":"src/Foo.sol","contractName":"Foo"}"#,
        );
        write_artifact(
            out.path(),
            "Bar.sol/Bar.json",
            r#"{"sourceName":"other/Bar.sol","contractName":"Bar"}"#,
        );
        let resolved = resolve_contract_ids(out.path(), &["src/".to_string()]);
        assert_eq!(resolved.ids, ["src/Foo.sol:Foo"]);
    }

    #[test]
    fn deduplicates_identifiers() {
        let out = tempdir().unwrap();
        let artifact = r#"{"sourceName":"src/Foo.sol","contractName":"Foo"}"#;
        write_artifact(out.path(), "Foo.sol/Foo.json", artifact);
        write_artifact(out.path(), "Other.sol/Foo.json", artifact);
        let resolved = resolve_contract_ids(out.path(), &[]);
        assert_eq!(resolved.ids, ["src/Foo.sol:Foo"]);
    }

    #[test]
    fn missing_out_dir_is_empty() {
        let resolved = resolve_contract_ids(Path::new("does/not/exist"), &[]);
        assert!(resolved.ids.is_empty());
        assert!(resolved.skipped.is_empty());
    }
}
