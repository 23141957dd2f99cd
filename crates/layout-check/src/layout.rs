//! The canonical storage-record model and the normalizer for `forge inspect`
//! output.

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

/// Matches compiler-version suffixes like `)123` in type annotations, e.g.
/// `t_contract(Token)456`.
static TYPE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\)\d+").unwrap());

/// A single storage variable of a compiled contract.
///
/// Ordering is structural: slot first, then offset, then label and type. Two
/// records describe the same declared variable across revisions when their
/// `(label, type)` pair matches, independent of where the compiler placed
/// them.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StorageRecord {
    pub slot: u64,
    pub offset: u64,
    pub label: String,
    pub ty: String,
}

impl StorageRecord {
    /// The key identifying a declared variable independently of its
    /// coordinates.
    pub fn var_key(&self) -> (&str, &str) {
        (&self.label, &self.ty)
    }
}

/// The shape the inspector emitted a layout in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutFormat {
    Json,
    Table,
}

/// A normalized layout for one contract, tagged with the format it was parsed
/// from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedLayout {
    pub format: LayoutFormat,
    pub records: Vec<StorageRecord>,
}

/// One entry of the `storageLayout` artifact field, with the fields we care
/// about. Older solc versions emit slots as strings, newer ones as numbers.
#[derive(Deserialize)]
struct RawEntry {
    slot: serde_json::Value,
    #[serde(default)]
    offset: serde_json::Value,
    #[serde(default)]
    label: String,
    #[serde(default, rename = "type")]
    ty: String,
}

/// Parses the output of `forge inspect <contract> storageLayout`.
///
/// The printed shape is not stable across forge versions: newer ones emit JSON
/// (the `storageLayout` object with a `storage` key, or a bare entry array),
/// older ones print a markdown table. JSON is tried first and the table as a
/// fallback; the two are never merged. Returns `None` when neither shape
/// applies, which callers treat as "no layout available".
pub fn parse_layout(raw: &str) -> Option<ParsedLayout> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(records) = parse_json_layout(raw) {
        return Some(ParsedLayout { format: LayoutFormat::Json, records });
    }
    let records = parse_table_layout(raw);
    if records.is_empty() {
        None
    } else {
        Some(ParsedLayout { format: LayoutFormat::Table, records })
    }
}

fn parse_json_layout(raw: &str) -> Option<Vec<StorageRecord>> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let items = match value {
        serde_json::Value::Object(mut map) => map.remove("storage")?,
        items @ serde_json::Value::Array(_) => items,
        _ => return None,
    };
    let entries: Vec<RawEntry> = serde_json::from_value(items).ok()?;

    let mut records = Vec::with_capacity(entries.len());
    for entry in entries {
        records.push(StorageRecord {
            slot: parse_int(&entry.slot)?,
            offset: parse_int(&entry.offset)?,
            label: entry.label,
            ty: TYPE_SUFFIX_RE.replace_all(&entry.ty, ")").into_owned(),
        });
    }
    Some(records)
}

/// Parses the pretty table output: `| <label> | <type> | <slot> | <offset> | <bytes> |`.
fn parse_table_layout(raw: &str) -> Vec<StorageRecord> {
    let mut records = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if !line.starts_with('|') {
            continue;
        }
        let cells: Vec<&str> = line.split('|').map(str::trim).collect();
        // The outer two cells are the table borders.
        let Some(cells) = cells.get(1..cells.len().saturating_sub(1)) else { continue };
        if cells.len() < 5 {
            continue;
        }
        // Header and separator rows.
        if cells[0].is_empty() || cells[0].eq_ignore_ascii_case("variable") {
            continue;
        }
        let (Ok(slot), Ok(offset)) = (cells[2].parse::<u64>(), cells[3].parse::<u64>()) else {
            continue;
        };
        records.push(StorageRecord {
            slot,
            offset,
            label: cells[0].to_string(),
            ty: cells[1].to_string(),
        });
    }
    records
}

/// Coerces a JSON slot/offset value to an integer. Strings are parsed as
/// integer literals with automatic base detection; an absent value is 0.
fn parse_int(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Null => Some(0),
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => parse_int_literal(s),
        _ => None,
    }
}

fn parse_int_literal(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}
