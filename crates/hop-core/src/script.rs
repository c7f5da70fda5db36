//! Script units: ordered change files inside patch and bootstrap directories
//!
//! Patch scripts are named `<sequence>_<description>.<ext>` and bootstrap
//! files `<number>-<unit_id>-<version>.<ext>`. Ordering is always by the
//! numeric prefix, never by directory listing order; two files sharing a
//! prefix in the same directory is an error.

use crate::error::{CoreError, CoreResult};
use crate::marker::{classify_file, UnitTag};
use crate::patch_id::PatchId;
use crate::version::Version;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static PATCH_SCRIPT_RE: OnceLock<Regex> = OnceLock::new();
static BOOTSTRAP_FILE_RE: OnceLock<Regex> = OnceLock::new();

fn patch_script_re() -> &'static Regex {
    PATCH_SCRIPT_RE
        .get_or_init(|| Regex::new(r"^(\d+)_(.+)\.(sql|py)$").expect("valid regex literal"))
}

fn bootstrap_file_re() -> &'static Regex {
    BOOTSTRAP_FILE_RE.get_or_init(|| {
        Regex::new(r"^(\d+)-(.+)-(\d+\.\d+\.\d+)\.(sql|py)$").expect("valid regex literal")
    })
}

/// How a script is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    /// Executed as a SQL batch against the target database
    Sql,
    /// Executed by the configured interpreter as a subprocess
    Procedural,
}

impl ScriptKind {
    /// Map a file extension to a script kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "sql" => Some(ScriptKind::Sql),
            "py" => Some(ScriptKind::Procedural),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ScriptKind::Sql => "sql",
            ScriptKind::Procedural => "py",
        }
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptKind::Sql => write!(f, "sql"),
            ScriptKind::Procedural => write!(f, "procedural"),
        }
    }
}

/// One ordered script inside a patch directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptUnit {
    /// Leading numeric prefix; the ordering key
    pub sequence_number: u64,

    /// Patch this unit belongs to
    pub patch_id: PatchId,

    /// SQL or procedural
    pub kind: ScriptKind,

    /// Bootstrap marker classification
    pub tag: UnitTag,

    /// File name, e.g. `2_add_index.sql`
    pub name: String,

    /// Absolute path to the file
    pub path: PathBuf,
}

impl ScriptUnit {
    /// Build a unit from a path, reading its first line for the marker.
    ///
    /// Returns `Ok(None)` for files that are not scripts (README.md etc.).
    pub fn from_path(path: &Path, patch_id: &PatchId) -> CoreResult<Option<Self>> {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return Ok(None);
        };
        let Some((sequence_number, kind)) = parse_patch_script_name(name) else {
            // A script without a usable prefix would silently drop out of the
            // ordering, so reject it instead of ignoring it.
            let has_script_ext = path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(ScriptKind::from_extension)
                .is_some();
            if has_script_ext {
                return Err(CoreError::InvalidScriptName {
                    name: name.to_string(),
                    expected: "<sequence>_<description>.<sql|py>",
                });
            }
            return Ok(None);
        };
        let tag = classify_file(path)?;
        Ok(Some(Self {
            sequence_number,
            patch_id: patch_id.clone(),
            kind,
            tag,
            name: name.to_string(),
            path: path.to_path_buf(),
        }))
    }

    /// Read the unit's content.
    pub fn read(&self) -> CoreResult<String> {
        std::fs::read_to_string(&self.path).map_err(|e| CoreError::io(&self.path, e))
    }
}

/// Parse `<sequence>_<description>.<ext>` into its sequence number and kind.
pub fn parse_patch_script_name(name: &str) -> Option<(u64, ScriptKind)> {
    let caps = patch_script_re().captures(name)?;
    let sequence = caps[1].parse().ok()?;
    let kind = ScriptKind::from_extension(&caps[3])?;
    Some((sequence, kind))
}

/// Discover the script units of a patch directory in ascending sequence order.
pub fn discover_units(dir: &Path, patch_id: &PatchId) -> CoreResult<Vec<ScriptUnit>> {
    let mut by_sequence: BTreeMap<u64, ScriptUnit> = BTreeMap::new();

    for path in list_files(dir)? {
        let Some(unit) = ScriptUnit::from_path(&path, patch_id)? else {
            log::debug!("Ignoring non-script file {}", path.display());
            continue;
        };
        if let Some(existing) = by_sequence.get(&unit.sequence_number) {
            return Err(duplicate_sequence(dir, unit.sequence_number, &existing.name, &unit.name));
        }
        by_sequence.insert(unit.sequence_number, unit);
    }

    Ok(by_sequence.into_values().collect())
}

/// A bootstrap unit file inside the bootstrap directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapFile {
    /// Leading numeric prefix; the ordering key
    pub number: u64,

    /// Unit identifier (usually the originating patch id)
    pub unit_id: String,

    /// Release that introduced the file; becomes the ledger origin version
    pub version: Version,

    pub kind: ScriptKind,

    /// File name; the ledger key
    pub name: String,

    pub path: PathBuf,
}

impl BootstrapFile {
    pub fn read(&self) -> CoreResult<String> {
        std::fs::read_to_string(&self.path).map_err(|e| CoreError::io(&self.path, e))
    }
}

/// Parse `<number>-<unit_id>-<version>.<ext>`.
pub fn parse_bootstrap_name(name: &str) -> Option<(u64, String, Version, ScriptKind)> {
    let caps = bootstrap_file_re().captures(name)?;
    let number = caps[1].parse().ok()?;
    let version = caps[3].parse().ok()?;
    let kind = ScriptKind::from_extension(&caps[4])?;
    Some((number, caps[2].to_string(), version, kind))
}

/// Format a bootstrap file name.
pub fn bootstrap_file_name(
    number: u64,
    unit_id: &str,
    version: Version,
    kind: ScriptKind,
) -> String {
    format!("{number}-{unit_id}-{version}.{}", kind.extension())
}

/// Discover bootstrap-tagged files in ascending numeric order.
///
/// Files that do not follow the naming convention, or whose first line does
/// not carry the bootstrap directive, are not candidates.
pub fn discover_bootstrap(dir: &Path) -> CoreResult<Vec<BootstrapFile>> {
    let mut by_number: BTreeMap<u64, BootstrapFile> = BTreeMap::new();

    for path in list_files(dir)? {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some((number, unit_id, version, kind)) = parse_bootstrap_name(name) else {
            if !name.starts_with('.') {
                log::warn!("Ignoring bootstrap file with unexpected name: {name}");
            }
            continue;
        };
        if !classify_file(&path)?.is_bootstrap() {
            log::debug!("Ignoring untagged file {name}");
            continue;
        }
        if let Some(existing) = by_number.get(&number) {
            return Err(duplicate_sequence(dir, number, &existing.name, name));
        }
        by_number.insert(
            number,
            BootstrapFile {
                number,
                unit_id,
                version,
                kind,
                name: name.to_string(),
                path,
            },
        );
    }

    Ok(by_number.into_values().collect())
}

/// Highest numeric prefix among all bootstrap-named files, tagged or not.
pub fn highest_bootstrap_number(dir: &Path) -> CoreResult<u64> {
    Ok(list_files(dir)?
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .filter_map(parse_bootstrap_name)
        .map(|(number, ..)| number)
        .max()
        .unwrap_or(0))
}

/// Regular files directly inside `dir`; a missing directory has no files.
fn list_files(dir: &Path) -> CoreResult<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(dir).map_err(|e| CoreError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| CoreError::io(dir, e))?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

fn duplicate_sequence(dir: &Path, sequence: u64, first: &str, second: &str) -> CoreError {
    let (first, second) = if first <= second {
        (first, second)
    } else {
        (second, first)
    };
    CoreError::DuplicateSequence {
        dir: dir.display().to_string(),
        sequence,
        first: first.to_string(),
        second: second.to_string(),
    }
}

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;
