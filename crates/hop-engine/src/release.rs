//! Release Stager: version bumps, stage-file appends and promotion.
//!
//! Stage commits carry the stage file and nothing else, so production
//! history keeps "what is scheduled" apart from "what changed".

use crate::error::{EngineError, EngineResult};
use crate::patch::require_branch;
use crate::vcs::Vcs;
use hop_core::script::highest_bootstrap_number;
use hop_core::{
    bootstrap_file_name, discover_units, BumpKind, HopConfig, PatchId, PatchRegistry, PatchStatus,
    ReleaseManifest, RepoLayout, StageFile, Version,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStatus {
    /// Stage file open for appends
    Staging,
    /// Promoted; the stage list is frozen
    Committed,
}

/// A versioned bundle of patches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    pub version: Version,
    pub stage_entries: Vec<PatchId>,
    pub status: ReleaseStatus,
}

impl Release {
    fn staging(stage: &StageFile) -> Self {
        Self {
            version: stage.version,
            stage_entries: stage.entries().to_vec(),
            status: ReleaseStatus::Staging,
        }
    }
}

pub struct ReleaseStager<'a> {
    layout: &'a RepoLayout,
    config: &'a HopConfig,
    vcs: &'a dyn Vcs,
}

impl<'a> ReleaseStager<'a> {
    pub fn new(layout: &'a RepoLayout, config: &'a HopConfig, vcs: &'a dyn Vcs) -> Self {
        Self {
            layout,
            config,
            vcs,
        }
    }

    /// Highest promoted version, `0.0.0` before the first release.
    pub fn last_released(&self) -> EngineResult<Version> {
        Ok(self
            .layout
            .released_versions()?
            .last()
            .copied()
            .unwrap_or_default())
    }

    /// Manifest of the highest promoted release, if one was written.
    pub fn last_manifest(&self) -> EngineResult<Option<ReleaseManifest>> {
        match self.layout.released_versions()?.last() {
            Some(version) => Ok(ReleaseManifest::load(&self.layout.manifest_file(*version))?),
            None => Ok(None),
        }
    }

    /// The open stage file, if any.
    fn open_stage(&self) -> EngineResult<Option<StageFile>> {
        let versions = self.layout.staging_versions()?;
        match versions.as_slice() {
            [] => Ok(None),
            [version] => Ok(Some(StageFile::load(
                &self.layout.stage_file(*version),
                *version,
            )?)),
            many => Err(EngineError::AmbiguousRelease {
                versions: many
                    .iter()
                    .map(Version::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// The release currently being staged.
    pub fn current_release(&self) -> EngineResult<Option<Release>> {
        Ok(self.open_stage()?.as_ref().map(Release::staging))
    }

    /// Open the next release: bump the last released version by `kind`,
    /// create its empty stage file and commit it alone.
    pub fn prepare(&self, kind: BumpKind) -> EngineResult<Version> {
        require_branch(self.vcs, &self.config.production_branch)?;
        if let Some(open) = self.layout.staging_versions()?.first() {
            return Err(EngineError::AlreadyStaging { version: *open });
        }

        let version = self.last_released()?.bump(kind)?;
        let stage = StageFile::empty(self.layout.stage_file(version), version);
        stage.save()?;
        self.vcs.commit(
            &[self.layout.relative(&stage.path)],
            &format!("[HOP] Prepare release {version}"),
        )?;
        log::info!("Prepared release {version} ({kind} bump)");
        Ok(version)
    }

    /// Append an applied patch to the open release and commit only the
    /// stage file.
    pub fn add_to_release(&self, id: &PatchId) -> EngineResult<Release> {
        require_branch(self.vcs, &self.config.production_branch)?;
        let mut stage = self.open_stage()?.ok_or(EngineError::NoOpenRelease)?;
        if stage.contains(id) {
            return Err(EngineError::DuplicatePatchInStage {
                id: id.to_string(),
                version: stage.version,
            });
        }

        let registry_path = self.layout.patch_registry_path();
        let mut registry = PatchRegistry::load(&registry_path)?;
        let status = registry.get(id)?.status;
        if status != PatchStatus::Applied {
            return Err(EngineError::PatchState {
                id: id.to_string(),
                actual: status,
                expected: "applied",
            });
        }

        stage.append(id.clone())?;
        stage.save()?;
        self.vcs.commit(
            &[self.layout.relative(&stage.path)],
            &format!("[HOP] Add {id} to release {}", stage.version),
        )?;

        let patch = registry.get_mut(id)?;
        patch.transition(PatchStatus::Staged)?;
        patch.release = Some(stage.version);
        registry.save(&registry_path)?;

        log::info!("Added {id} to release {}", stage.version);
        Ok(Release::staging(&stage))
    }

    /// Promote the open release.
    ///
    /// Merges the staged patch branches in stage order, copies their
    /// bootstrap-tagged units into the bootstrap directory numbered after
    /// the existing files, archives the stage file as the release file,
    /// writes the release manifest and commits exactly those files.
    pub fn promote(&self, changelog_message: &str) -> EngineResult<Release> {
        require_branch(self.vcs, &self.config.production_branch)?;
        let stage = self.open_stage()?.ok_or(EngineError::NoOpenRelease)?;
        let version = stage.version;
        if stage.is_empty() {
            return Err(EngineError::EmptyRelease { version });
        }

        let registry_path = self.layout.patch_registry_path();
        let mut registry = PatchRegistry::load(&registry_path)?;
        for id in stage.entries() {
            let status = registry.get(id)?.status;
            if status != PatchStatus::Staged {
                return Err(EngineError::PatchState {
                    id: id.to_string(),
                    actual: status,
                    expected: "staged",
                });
            }
        }

        for id in stage.entries() {
            self.vcs.merge(
                &id.branch_name(),
                &format!("[HOP] Merge {id} into release {version}"),
            )?;
        }

        let manifest_path = self.layout.manifest_file(version);
        let release_file = self.layout.release_file(version);
        let manifest = ReleaseManifest {
            tool_version: self.config.tool_version,
            changelog_message: changelog_message.to_string(),
            new_release_identifier: version,
        };
        // The rename comes last: once the release file exists the stage is
        // closed, and any failure from here on is undone below.
        let mut copied = Vec::new();
        let written = self
            .copy_bootstrap_units(&stage, &mut copied)
            .and_then(|()| manifest.save(&manifest_path).map_err(EngineError::from))
            .and_then(|()| {
                std::fs::rename(&stage.path, &release_file)
                    .map_err(|e| EngineError::io(&stage.path, e))
            });
        if let Err(err) = written {
            self.discard_promotion(&stage, &copied, &manifest_path);
            return Err(err);
        }

        let mut paths = copied.clone();
        paths.extend([release_file, stage.path.clone(), manifest_path.clone()]);
        let paths: Vec<PathBuf> = paths.iter().map(|p| self.layout.relative(p)).collect();
        if let Err(err) = self.vcs.commit(&paths, &format!("[HOP] Release {version}")) {
            self.discard_promotion(&stage, &copied, &manifest_path);
            return Err(err);
        }

        for id in stage.entries() {
            registry.get_mut(id)?.transition(PatchStatus::Released)?;
        }
        registry.save(&registry_path)?;

        log::info!(
            "Released {version} with {} patch(es)",
            stage.entries().len()
        );
        Ok(Release {
            version,
            stage_entries: stage.entries().to_vec(),
            status: ReleaseStatus::Committed,
        })
    }

    /// Undo the working-tree side of an uncommitted promotion so the stage
    /// file is open again and a later `promote` starts from scratch.
    fn discard_promotion(&self, stage: &StageFile, copied: &[PathBuf], manifest: &Path) {
        let release_file = self.layout.release_file(stage.version);
        if release_file.exists() && !stage.path.exists() {
            if let Err(e) = std::fs::rename(&release_file, &stage.path) {
                log::error!(
                    "Could not restore {} from {}: {e}",
                    stage.path.display(),
                    release_file.display()
                );
            }
        }
        for path in copied.iter().map(PathBuf::as_path).chain([manifest]) {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    log::error!("Could not remove {}: {e}", path.display());
                }
            }
        }
        log::warn!(
            "Release {} was not committed; its stage file is open again",
            stage.version
        );
    }

    /// Copy bootstrap-tagged units, pushing each target onto `copied` as it
    /// is written so a partial copy can be undone.
    fn copy_bootstrap_units(
        &self,
        stage: &StageFile,
        copied: &mut Vec<PathBuf>,
    ) -> EngineResult<()> {
        let dir = self.layout.bootstrap_dir();
        let mut number = highest_bootstrap_number(&dir)?;

        for id in stage.entries() {
            let units = discover_units(&self.layout.patch_dir(id), id)?;
            for unit in units.iter().filter(|u| u.tag.is_bootstrap()) {
                number += 1;
                let name = bootstrap_file_name(number, id.as_str(), stage.version, unit.kind);
                let target = dir.join(&name);
                std::fs::create_dir_all(&dir).map_err(|e| EngineError::io(&dir, e))?;
                std::fs::copy(&unit.path, &target).map_err(|e| EngineError::io(&unit.path, e))?;
                log::debug!("Copied {} to {}", unit.name, name);
                copied.push(target);
            }
        }
        Ok(())
    }
}
