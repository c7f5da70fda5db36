//! hop-engine - Patch and release orchestration
//!
//! Coordinates three state spaces that share no transaction: a branch per
//! patch, a schema mutated by ordered scripts, and ledgers of what has
//! already been applied.
//!
//! - [`PatchManager`] creates patches and applies their scripts through the
//!   [`ScriptRunner`].
//! - [`ReleaseStager`] opens releases, appends applied patches and promotes.
//! - [`BootstrapRunner`] runs data-initialization files once per ledger.
//! - [`MigrationSequencer`] upgrades the repository structure itself.
//!
//! Every mutating operation checks its precondition (current branch, stage
//! file presence, patch state) first and fails with a typed error before
//! touching anything.

pub mod bootstrap;
pub mod error;
pub mod executor;
pub mod hook;
pub mod init;
pub mod patch;
pub mod reconcile;
pub mod release;
pub mod runner;
pub mod sequencer;
pub mod steps;
pub mod vcs;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use bootstrap::{BootstrapMode, BootstrapReport, BootstrapRunner};
pub use error::{EngineError, EngineResult, ErrorKind};
pub use executor::{DbScriptExecutor, ScriptExecutor, UnitRef};
pub use hook::{CodegenHook, CommandHook, NoopHook};
pub use init::init;
pub use patch::PatchManager;
pub use reconcile::{reconcile_bootstrap, reconcile_migrations, ReconcileReport};
pub use release::{Release, ReleaseStager, ReleaseStatus};
pub use runner::{RunMode, RunReport, ScriptRunner, UnitFailure};
pub use sequencer::{MigrationSequencer, StepOutcome, UpgradeReport};
pub use steps::{latest_version, MigrationStep, StepContext, STEPS};
pub use vcs::{GitCli, Vcs};

#[cfg(any(test, feature = "test-support"))]
pub use vcs::{MemoryCommit, MemoryVcs};
