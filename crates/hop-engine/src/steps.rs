//! Registered repository upgrade steps, in ascending version order.

use crate::error::{EngineError, EngineResult};
use hop_core::{write_atomic, RepoLayout, Version};
use std::fmt;
use std::path::PathBuf;

/// What a step may touch.
pub struct StepContext<'a> {
    pub layout: &'a RepoLayout,
}

/// A step's operation. Returns the files it created, changed or removed.
pub type StepFn = fn(&StepContext<'_>) -> EngineResult<Vec<PathBuf>>;

/// One versioned upgrade operation.
#[derive(Clone, Copy)]
pub struct MigrationStep {
    pub version: Version,
    pub description: &'static str,
    pub apply: StepFn,
}

impl MigrationStep {
    /// Ledger key for this step.
    pub fn key(&self) -> String {
        self.version.to_string()
    }
}

impl fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationStep")
            .field("version", &self.version)
            .field("description", &self.description)
            .finish()
    }
}

/// Every step the tool knows, ascending.
pub static STEPS: &[MigrationStep] = &[
    MigrationStep {
        version: Version::new(0, 16, 0),
        description: "create repository layout directories",
        apply: ensure_layout,
    },
    MigrationStep {
        version: Version::new(0, 17, 0),
        description: "rename legacy -patches.txt stage files",
        apply: rename_legacy_stage_files,
    },
    MigrationStep {
        version: Version::new(0, 17, 4),
        description: "normalize stage files",
        apply: normalize_stage_files,
    },
    MigrationStep {
        version: Version::new(0, 17, 5),
        description: "ignore local database artifacts",
        apply: ignore_local_artifacts,
    },
];

/// Version of the last registered step.
pub fn latest_version() -> Version {
    STEPS.last().map(|s| s.version).unwrap_or_default()
}

const LEGACY_STAGE_SUFFIX: &str = "-patches.txt";
const GITKEEP: &str = ".gitkeep";
const GITIGNORE: &str = ".gitignore";

/// Entries kept out of version control.
pub const LOCAL_ARTIFACTS: &[&str] = &["*.duckdb", "*.duckdb.wal", ".hop/patches.json"];

pub(crate) fn ensure_layout(ctx: &StepContext<'_>) -> EngineResult<Vec<PathBuf>> {
    let mut touched = Vec::new();
    for dir in [
        ctx.layout.patches_dir(),
        ctx.layout.releases_dir(),
        ctx.layout.bootstrap_dir(),
    ] {
        std::fs::create_dir_all(&dir).map_err(|e| EngineError::io(&dir, e))?;
        let keep = dir.join(GITKEEP);
        if !keep.exists() {
            std::fs::write(&keep, "").map_err(|e| EngineError::io(&keep, e))?;
            touched.push(keep);
        }
    }
    Ok(touched)
}

fn rename_legacy_stage_files(ctx: &StepContext<'_>) -> EngineResult<Vec<PathBuf>> {
    let dir = ctx.layout.releases_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut legacy: Vec<(Version, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(&dir).map_err(|e| EngineError::io(&dir, e))? {
        let path = entry.map_err(|e| EngineError::io(&dir, e))?.path();
        let version = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(LEGACY_STAGE_SUFFIX))
            .and_then(|stem| stem.parse::<Version>().ok());
        if let Some(version) = version {
            legacy.push((version, path));
        }
    }
    legacy.sort();

    let mut touched = Vec::new();
    for (version, old) in legacy {
        let new = ctx.layout.stage_file(version);
        if new.exists() {
            return Err(EngineError::io(
                &new,
                std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("cannot rename {} over it", old.display()),
                ),
            ));
        }
        std::fs::rename(&old, &new).map_err(|e| EngineError::io(&old, e))?;
        log::info!("Renamed {} to {}", old.display(), new.display());
        touched.push(old);
        touched.push(new);
    }
    Ok(touched)
}

fn normalize_stage_files(ctx: &StepContext<'_>) -> EngineResult<Vec<PathBuf>> {
    let mut touched = Vec::new();
    for version in ctx.layout.staging_versions()? {
        let path = ctx.layout.stage_file(version);
        let raw = std::fs::read_to_string(&path).map_err(|e| EngineError::io(&path, e))?;
        let normalized: String = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| format!("{line}\n"))
            .collect();
        if normalized != raw {
            write_atomic(&path, normalized.as_bytes())?;
            touched.push(path);
        }
    }
    Ok(touched)
}

pub(crate) fn ignore_local_artifacts(ctx: &StepContext<'_>) -> EngineResult<Vec<PathBuf>> {
    let path = ctx.layout.root().join(GITIGNORE);
    let mut content = if path.exists() {
        std::fs::read_to_string(&path).map_err(|e| EngineError::io(&path, e))?
    } else {
        String::new()
    };

    let missing: Vec<&str> = LOCAL_ARTIFACTS
        .iter()
        .copied()
        .filter(|entry| !content.lines().any(|line| line.trim() == *entry))
        .collect();
    if missing.is_empty() {
        return Ok(Vec::new());
    }

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    for entry in missing {
        content.push_str(entry);
        content.push('\n');
    }
    write_atomic(&path, content.as_bytes())?;
    Ok(vec![path])
}

#[cfg(test)]
#[path = "steps_test.rs"]
mod tests;
