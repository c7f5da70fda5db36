//! Repository layout: where every persisted artifact lives

use crate::error::{CoreError, CoreResult};
use crate::patch_id::PatchId;
use crate::version::Version;
use std::path::{Path, PathBuf};

pub const HOP_DIR: &str = ".hop";
pub const CONFIG_FILE: &str = "config.yml";
pub const MIGRATION_LEDGER_FILE: &str = "migrations.json";
pub const PATCH_REGISTRY_FILE: &str = "patches.json";
pub const UPGRADE_PENDING_FILE: &str = "upgrade-pending.json";
pub const PATCHES_DIR: &str = "Patches";
pub const RELEASES_DIR: &str = "releases";
pub const BOOTSTRAP_DIR: &str = "bootstrap";

const STAGE_SUFFIX: &str = "-stage.txt";

/// Paths of a hop-managed repository rooted at `root`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLayout {
    root: PathBuf,
}

impl RepoLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn hop_dir(&self) -> PathBuf {
        self.root.join(HOP_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.hop_dir().join(CONFIG_FILE)
    }

    pub fn migration_ledger_path(&self) -> PathBuf {
        self.hop_dir().join(MIGRATION_LEDGER_FILE)
    }

    /// Files touched by applied upgrade steps that are not committed yet
    pub fn upgrade_pending_path(&self) -> PathBuf {
        self.hop_dir().join(UPGRADE_PENDING_FILE)
    }

    pub fn patch_registry_path(&self) -> PathBuf {
        self.hop_dir().join(PATCH_REGISTRY_FILE)
    }

    pub fn patches_dir(&self) -> PathBuf {
        self.root.join(PATCHES_DIR)
    }

    pub fn patch_dir(&self, id: &PatchId) -> PathBuf {
        self.patches_dir().join(id.as_str())
    }

    pub fn releases_dir(&self) -> PathBuf {
        self.root.join(RELEASES_DIR)
    }

    /// `releases/<version>-stage.txt`
    pub fn stage_file(&self, version: Version) -> PathBuf {
        self.releases_dir().join(format!("{version}{STAGE_SUFFIX}"))
    }

    /// `releases/<version>.txt`, the archived stage file of a promoted release
    pub fn release_file(&self, version: Version) -> PathBuf {
        self.releases_dir().join(format!("{version}.txt"))
    }

    /// `releases/<version>.json`
    pub fn manifest_file(&self, version: Version) -> PathBuf {
        self.releases_dir().join(format!("{version}.json"))
    }

    pub fn bootstrap_dir(&self) -> PathBuf {
        self.root.join(BOOTSTRAP_DIR)
    }

    /// Express `path` relative to the repository root (for commits).
    pub fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }

    /// Versions of all promoted releases, ascending.
    pub fn released_versions(&self) -> CoreResult<Vec<Version>> {
        let mut versions: Vec<Version> = self
            .release_file_names()?
            .iter()
            .filter_map(|name| name.strip_suffix(".txt"))
            .filter(|stem| !stem.ends_with("-stage"))
            .filter_map(|stem| stem.parse().ok())
            .collect();
        versions.sort();
        Ok(versions)
    }

    /// Versions that currently have an open stage file, ascending.
    pub fn staging_versions(&self) -> CoreResult<Vec<Version>> {
        let mut versions: Vec<Version> = self
            .release_file_names()?
            .iter()
            .filter_map(|name| name.strip_suffix(STAGE_SUFFIX))
            .filter_map(|stem| stem.parse().ok())
            .collect();
        versions.sort();
        Ok(versions)
    }

    fn release_file_names(&self) -> CoreResult<Vec<String>> {
        let dir = self.releases_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&dir).map_err(|e| CoreError::io(&dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::io(&dir, e))?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod tests;
