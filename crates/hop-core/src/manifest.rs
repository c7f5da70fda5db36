//! Release manifest: the small record written when a release is promoted

use crate::error::{CoreError, CoreResult};
use crate::fs_util::write_atomic;
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Persisted summary of one completed release cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReleaseManifest {
    /// Tool version that produced the release
    pub tool_version: Version,

    /// Human-readable changelog entry
    pub changelog_message: String,

    /// The release that was created
    pub new_release_identifier: Version,
}

impl ReleaseManifest {
    /// Write the manifest as pretty JSON, atomically.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        write_atomic(path, json.as_bytes())
    }

    /// Read a manifest back.
    ///
    /// Returns `Ok(None)` when the file does not exist and
    /// [`CoreError::MalformedManifest`] when it exists but does not parse.
    pub fn load(path: &Path) -> CoreResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| CoreError::MalformedManifest {
                path: path.display().to_string(),
                source,
            })
    }
}

#[cfg(test)]
#[path = "manifest_test.rs"]
mod tests;
