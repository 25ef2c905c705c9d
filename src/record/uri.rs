//! Mapping between record IDs and their on-disk file names.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{GraphError, Result};

/// How a file in the corpus relates to the record it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    /// `<id>.geojson`: the canonical, current representation.
    Principal(i64),
    /// `<id>-alt-<source>.geojson`: an alternate geometry or source.
    Alternate(i64),
}

fn file_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d+)(-alt-[^/\\]+)?\.geojson$").expect("Invalid regex pattern")
    })
}

/// Relative path for a record ID, e.g. `101736545` → `101/736/545/101736545.geojson`.
pub fn id_to_rel_path(id: i64) -> Result<String> {
    if id < 0 {
        return Err(GraphError::InvalidId(id));
    }

    let digits = id.to_string();
    let groups: Vec<&str> = digits
        .as_bytes()
        .chunks(3)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .collect();

    Ok(format!("{}/{}.geojson", groups.join("/"), digits))
}

/// Classify a file by name. Returns `None` for files that are not records.
pub fn classify_path(path: &Path) -> Option<FileKind> {
    let name = path.file_name()?.to_str()?;
    let caps = file_name_regex().captures(name)?;
    let id = caps.get(1)?.as_str().parse().ok()?;

    if caps.get(2).is_some() {
        Some(FileKind::Alternate(id))
    } else {
        Some(FileKind::Principal(id))
    }
}
