//! Patch Manager: patch creation, application and lifecycle queries.

use crate::error::{EngineError, EngineResult};
use crate::runner::{RunMode, RunReport, ScriptRunner};
use crate::vcs::Vcs;
use hop_core::{
    discover_units, HopConfig, Patch, PatchId, PatchRegistry, PatchStatus, RepoLayout, ScriptUnit,
};

const GITKEEP: &str = ".gitkeep";

pub struct PatchManager<'a> {
    layout: &'a RepoLayout,
    config: &'a HopConfig,
    vcs: &'a dyn Vcs,
}

impl<'a> PatchManager<'a> {
    pub fn new(layout: &'a RepoLayout, config: &'a HopConfig, vcs: &'a dyn Vcs) -> Self {
        Self {
            layout,
            config,
            vcs,
        }
    }

    fn registry(&self) -> EngineResult<PatchRegistry> {
        Ok(PatchRegistry::load(&self.layout.patch_registry_path())?)
    }

    /// Create a patch: its branch (checked out), its script directory and
    /// its registry entry.
    ///
    /// Must be run from the production branch. An id is never reused, even
    /// after the patch was released.
    pub fn create(&self, id: &PatchId) -> EngineResult<Patch> {
        require_branch(self.vcs, &self.config.production_branch)?;

        let mut registry = self.registry()?;
        if let Ok(existing) = registry.get(id) {
            return Err(EngineError::DuplicatePatch {
                id: id.to_string(),
                found: format!("registered as {}", existing.status),
            });
        }
        let branch = id.branch_name();
        if self.vcs.branch_exists(&branch)? {
            return Err(EngineError::DuplicatePatch {
                id: id.to_string(),
                found: format!("branch {branch}"),
            });
        }
        let dir = self.layout.patch_dir(id);
        if dir.exists() {
            return Err(EngineError::DuplicatePatch {
                id: id.to_string(),
                found: format!("directory {}", self.layout.relative(&dir).display()),
            });
        }

        self.vcs.create_branch(&branch)?;
        std::fs::create_dir_all(&dir).map_err(|e| EngineError::io(&dir, e))?;
        let keep = dir.join(GITKEEP);
        std::fs::write(&keep, "").map_err(|e| EngineError::io(&keep, e))?;
        self.vcs.commit(
            &[self.layout.relative(&keep)],
            &format!("[HOP] Create patch {id}"),
        )?;

        let patch = Patch::new(id.clone());
        registry.insert(patch.clone());
        registry.save(&self.layout.patch_registry_path())?;
        log::info!("Created patch {id} on branch {branch}");
        Ok(patch)
    }

    /// Units of a patch, in sequence order.
    pub fn units(&self, id: &PatchId) -> EngineResult<Vec<ScriptUnit>> {
        Ok(discover_units(&self.layout.patch_dir(id), id)?)
    }

    /// Apply a patch's units through `runner`.
    ///
    /// The patch's branch must be checked out. On full success the patch
    /// becomes `Applied`; a partial failure leaves its status unchanged and
    /// is returned as [`EngineError::ScriptFailed`].
    pub async fn apply(
        &self,
        id: &PatchId,
        runner: &ScriptRunner<'_>,
        mode: RunMode,
    ) -> EngineResult<RunReport> {
        require_branch(self.vcs, &id.branch_name())?;

        let mut registry = self.registry()?;
        let status = registry.get(id)?.status;
        if !status.can_transition_to(PatchStatus::Applied) {
            return Err(EngineError::PatchState {
                id: id.to_string(),
                actual: status,
                expected: "created or applied",
            });
        }

        let units = self.units(id)?;
        let mut report = runner.apply(&units, mode).await?;

        if let Some(failure) = report.failed.take() {
            return Err(EngineError::ScriptFailed {
                patch: id.to_string(),
                unit: failure.unit,
                applied: report.applied.len(),
                not_attempted: report.not_attempted.len(),
                source: Box::new(failure.error),
            });
        }
        if mode == RunMode::DryRun {
            return Ok(report);
        }

        registry.get_mut(id)?.transition(PatchStatus::Applied)?;
        registry.save(&self.layout.patch_registry_path())?;
        log::info!("Applied patch {id} ({} unit(s))", report.applied.len());
        Ok(report)
    }

    pub fn status(&self, id: &PatchId) -> EngineResult<Patch> {
        Ok(self.registry()?.get(id)?.clone())
    }

    pub fn list(&self) -> EngineResult<Vec<Patch>> {
        Ok(self.registry()?.patches().to_vec())
    }
}

/// Fail with `WrongBranch` unless `expected` is checked out.
pub(crate) fn require_branch(vcs: &dyn Vcs, expected: &str) -> EngineResult<()> {
    let actual = vcs.current_branch()?;
    if actual != expected {
        return Err(EngineError::WrongBranch {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}
