//! Patch lifecycle and the local patch registry
//!
//! A patch moves `Created -> Applied -> Staged -> Released`. Re-applying an
//! `Applied` patch is allowed; every other move is rejected. Patches are never
//! removed from the registry, so an id stays reserved after release.

use crate::error::{CoreError, CoreResult};
use crate::fs_util::write_atomic;
use crate::patch_id::PatchId;
use crate::version::Version;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Lifecycle state of a patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchStatus {
    Created,
    Applied,
    Staged,
    Released,
}

impl PatchStatus {
    /// Whether the lifecycle permits moving from `self` to `next`.
    pub fn can_transition_to(self, next: PatchStatus) -> bool {
        use PatchStatus::*;
        matches!(
            (self, next),
            (Created, Applied) | (Applied, Applied) | (Applied, Staged) | (Staged, Released)
        )
    }
}

impl fmt::Display for PatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchStatus::Created => write!(f, "created"),
            PatchStatus::Applied => write!(f, "applied"),
            PatchStatus::Staged => write!(f, "staged"),
            PatchStatus::Released => write!(f, "released"),
        }
    }
}

/// A tracked unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub id: PatchId,

    pub status: PatchStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Release the patch was staged into, once staged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<Version>,
}

impl Patch {
    pub fn new(id: PatchId) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: PatchStatus::Created,
            created_at: now,
            updated_at: now,
            release: None,
        }
    }

    pub fn branch_name(&self) -> String {
        self.id.branch_name()
    }

    /// Move to `next`, rejecting moves the lifecycle does not allow.
    pub fn transition(&mut self, next: PatchStatus) -> CoreResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                id: self.id.to_string(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// All patches known to this working copy, in creation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRegistry {
    #[serde(default)]
    patches: Vec<Patch>,
}

impl PatchRegistry {
    /// Load the registry; a missing file is an empty registry.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save the registry atomically.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        write_atomic(path, json.as_bytes())
    }

    pub fn contains(&self, id: &PatchId) -> bool {
        self.patches.iter().any(|p| &p.id == id)
    }

    pub fn get(&self, id: &PatchId) -> CoreResult<&Patch> {
        self.patches
            .iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| CoreError::PatchNotFound { id: id.to_string() })
    }

    pub fn get_mut(&mut self, id: &PatchId) -> CoreResult<&mut Patch> {
        self.patches
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| CoreError::PatchNotFound { id: id.to_string() })
    }

    /// Register a new patch; callers check uniqueness first.
    pub fn insert(&mut self, patch: Patch) {
        debug_assert!(!self.contains(&patch.id), "patch registered twice");
        self.patches.push(patch);
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }
}

#[cfg(test)]
#[path = "patch_test.rs"]
mod tests;
