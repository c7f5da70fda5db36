//! Repository initialisation.

use crate::error::{EngineError, EngineResult};
use crate::steps::{ensure_layout, ignore_local_artifacts, latest_version, StepContext};
use crate::vcs::Vcs;
use hop_core::{HopConfig, RepoLayout};
use std::path::PathBuf;

/// Write the configuration and layout of a new repository and commit them
/// on the production branch, creating that branch if needed.
///
/// The declared tool version is the latest registered migration step: a new
/// repository is already at the current structure.
pub fn init(
    layout: &RepoLayout,
    package_name: &str,
    production_branch: &str,
    vcs: &dyn Vcs,
) -> EngineResult<HopConfig> {
    let config_path = layout.config_path();
    if config_path.exists() {
        return Err(EngineError::AlreadyInitialized {
            path: config_path.display().to_string(),
        });
    }
    let config = HopConfig {
        production_branch: production_branch.to_string(),
        ..HopConfig::new(package_name, latest_version())
    };

    // Validates the branch name before anything else changes.
    config.save(&config_path)?;

    if vcs.current_branch()? != production_branch {
        if vcs.branch_exists(production_branch)? {
            vcs.checkout(production_branch)?;
        } else {
            vcs.create_branch(production_branch)?;
        }
    }

    let ctx = StepContext { layout };
    let mut touched: Vec<PathBuf> = vec![config_path];
    touched.extend(ensure_layout(&ctx)?);
    touched.extend(ignore_local_artifacts(&ctx)?);

    let paths: Vec<PathBuf> = touched.iter().map(|p| layout.relative(p)).collect();
    vcs.commit(&paths, &format!("[HOP] Initialize {package_name}"))?;
    log::info!("Initialized {package_name} on {production_branch}");
    Ok(config)
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
