//! hop-core - Core library for hop
//!
//! This crate provides the shared domain types used across all hop
//! components: patch identifiers and lifecycle, semantic versions, script
//! units and their bootstrap markers, stage files, release manifests,
//! repository layout and configuration.

pub mod config;
pub mod error;
pub mod fs_util;
pub mod layout;
pub mod manifest;
pub mod marker;
pub mod patch;
pub mod patch_id;
pub mod script;
pub mod stage;
pub mod version;

pub use config::{DatabaseConfig, HopConfig};
pub use error::{CoreError, CoreResult};
pub use fs_util::write_atomic;
pub use layout::RepoLayout;
pub use manifest::ReleaseManifest;
pub use marker::{classify_file, classify_line, UnitTag, BOOTSTRAP_DIRECTIVE};
pub use patch::{Patch, PatchRegistry, PatchStatus};
pub use patch_id::{PatchId, PATCH_BRANCH_PREFIX};
pub use script::{
    bootstrap_file_name, discover_bootstrap, discover_units, BootstrapFile, ScriptKind, ScriptUnit,
};
pub use stage::StageFile;
pub use version::{BumpKind, Version};
