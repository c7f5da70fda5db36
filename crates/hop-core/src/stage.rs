//! Stage files: the append-only list of patches scheduled for a release
//!
//! Format: one patch id per line, no blank lines, trailing newline after the
//! last entry. An empty stage file (no entries) is zero bytes.

use crate::error::{CoreError, CoreResult};
use crate::fs_util::write_atomic;
use crate::patch_id::PatchId;
use crate::version::Version;
use std::path::{Path, PathBuf};

/// In-memory view of one release's stage file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFile {
    /// Location on disk
    pub path: PathBuf,

    /// Release the file belongs to
    pub version: Version,

    entries: Vec<PatchId>,
}

impl StageFile {
    /// A new, empty stage file (not yet written).
    pub fn empty(path: PathBuf, version: Version) -> Self {
        Self {
            path,
            version,
            entries: Vec::new(),
        }
    }

    /// Load and validate a stage file.
    pub fn load(path: &Path, version: Version) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        let entries = parse_entries(&content, path)?;
        Ok(Self {
            path: path.to_path_buf(),
            version,
            entries,
        })
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[PatchId] {
        &self.entries
    }

    pub fn contains(&self, id: &PatchId) -> bool {
        self.entries.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry in memory. A duplicate is an error, never a no-op.
    pub fn append(&mut self, id: PatchId) -> CoreResult<()> {
        if self.contains(&id) {
            return Err(CoreError::DuplicateStageEntry {
                id: id.into_inner(),
                path: self.path.display().to_string(),
            });
        }
        self.entries.push(id);
        Ok(())
    }

    /// Serialized file content.
    pub fn render(&self) -> String {
        self.entries.iter().map(|id| format!("{id}\n")).collect()
    }

    /// Write the file atomically.
    pub fn save(&self) -> CoreResult<()> {
        write_atomic(&self.path, self.render().as_bytes())
    }
}

/// Parse stage file content into entries.
///
/// A missing trailing newline on the last line is tolerated on read (the
/// next save restores it); blank lines, invalid ids and repeated ids are not.
pub fn parse_entries(content: &str, path: &Path) -> CoreResult<Vec<PatchId>> {
    let malformed = |reason: String| CoreError::MalformedStageFile {
        path: path.display().to_string(),
        reason,
    };

    if content.is_empty() {
        return Ok(Vec::new());
    }
    let body = content.strip_suffix('\n').unwrap_or(content);

    let mut entries: Vec<PatchId> = Vec::new();
    for (idx, line) in body.split('\n').enumerate() {
        let line_no = idx + 1;
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            return Err(malformed(format!("blank line at line {line_no}")));
        }
        let id = PatchId::parse(line.trim())
            .map_err(|e| malformed(format!("line {line_no}: {e}")))?;
        if entries.contains(&id) {
            return Err(malformed(format!("line {line_no}: '{id}' listed twice")));
        }
        entries.push(id);
    }
    Ok(entries)
}

#[cfg(test)]
#[path = "stage_test.rs"]
mod tests;
