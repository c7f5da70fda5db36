//! Error types for the orchestration engine

use hop_core::{CoreError, PatchStatus, Version};
use hop_db::DbError;
use hop_ledger::LedgerError;
use std::fmt;
use thiserror::Error;

/// Broad failure class, used by callers to decide how to report and exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed id, version, bump kind, file name or configuration
    Validation,
    /// Wrong branch, wrong lifecycle state, open or missing stage file
    State,
    /// Duplicate patch id, ledger key or stage entry
    Duplicate,
    /// A script, hook, migration step or subprocess failed
    Execution,
    /// A guarded action succeeded but its ledger record could not be written
    TrackingGap,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::State => write!(f, "state"),
            ErrorKind::Duplicate => write!(f, "duplicate"),
            ErrorKind::Execution => write!(f, "execution"),
            ErrorKind::TrackingGap => write!(f, "tracking gap"),
        }
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// P001: Operation requires a different current branch
    #[error("[P001] Must be on branch '{expected}' (currently on '{actual}')")]
    WrongBranch { expected: String, actual: String },

    /// P002: No stage file is open
    #[error("[P002] No release is being staged; run prepare-release first")]
    NoOpenRelease,

    /// P003: A release is already staging
    #[error("[P003] Release {version} is already being staged")]
    AlreadyStaging { version: Version },

    /// P004: More than one stage file exists
    #[error("[P004] Several releases are being staged at once: {versions}")]
    AmbiguousRelease { versions: String },

    /// P005: Patch is in the wrong lifecycle state for the operation
    #[error("[P005] Patch '{id}' is {actual}, expected {expected}")]
    PatchState {
        id: String,
        actual: PatchStatus,
        expected: &'static str,
    },

    /// P006: Patch id already in use
    #[error("[P006] Patch '{id}' already exists ({found})")]
    DuplicatePatch { id: String, found: String },

    /// P007: Patch already listed in the stage file
    #[error("[P007] Patch '{id}' is already part of release {version}")]
    DuplicatePatchInStage { id: String, version: Version },

    /// P008: Release has nothing to promote
    #[error("[P008] Release {version} has no patches")]
    EmptyRelease { version: Version },

    /// P009: A script unit could not be executed
    #[error("[P009] Unit '{unit}' failed: {message}")]
    UnitFailed { unit: String, message: String },

    /// P010: The code generation hook failed after a unit
    #[error("[P010] Code generation failed after unit '{unit}': {message}")]
    HookFailed { unit: String, message: String },

    /// P011: An ordered patch run stopped at a failing unit
    #[error(
        "[P011] Patch '{patch}' stopped at unit '{unit}' ({applied} applied, {not_attempted} not attempted): {source}"
    )]
    ScriptFailed {
        patch: String,
        unit: String,
        applied: usize,
        not_attempted: usize,
        #[source]
        source: Box<EngineError>,
    },

    /// P012: Units are not in strictly ascending sequence order
    #[error("[P012] Unit '{unit}' (#{sequence}) is out of order after #{previous}")]
    UnitOrder {
        unit: String,
        sequence: u64,
        previous: u64,
    },

    /// P013: A unit file disappeared between discovery and execution
    #[error("[P013] Unit file missing: {path}")]
    MissingUnit { path: String },

    /// P014: A migration step failed
    #[error(
        "[P014] Migration step {version} ({description}) failed; repository left at {reached}: {source}"
    )]
    MigrationFailed {
        version: Version,
        description: &'static str,
        reached: Version,
        #[source]
        source: Box<EngineError>,
    },

    /// P015: A step was requested before an earlier pending one
    #[error("[P015] Migration step {requested} cannot run before pending step {pending}")]
    StepOutOfOrder { requested: Version, pending: Version },

    /// P016: Registered step table is not strictly increasing
    #[error("[P016] Invalid migration step table: {reason}")]
    StepTable { reason: String },

    /// P017: Guarded action succeeded, ledger write failed
    #[error("[P017] '{key}' was applied but could not be recorded; reconcile before re-running: {source}")]
    TrackingGap {
        key: String,
        #[source]
        source: LedgerError,
    },

    /// P018: Reconcile named a bootstrap file that is not a candidate
    #[error("[P018] Unknown bootstrap file '{name}'")]
    UnknownBootstrapFile { name: String },

    /// P019: Repository already has a configuration
    #[error("[P019] Repository already initialised: {path}")]
    AlreadyInitialized { path: String },

    /// P020: A version-control command failed
    #[error("[P020] Version control command '{command}' failed: {message}")]
    Vcs { command: String, message: String },

    /// P021: A repository file could not be read or written
    #[error("[P021] Failed to access '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type alias for EngineError
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Attach a path to an IO error.
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::WrongBranch { .. }
            | EngineError::NoOpenRelease
            | EngineError::AlreadyStaging { .. }
            | EngineError::AmbiguousRelease { .. }
            | EngineError::PatchState { .. }
            | EngineError::EmptyRelease { .. }
            | EngineError::StepOutOfOrder { .. }
            | EngineError::AlreadyInitialized { .. } => ErrorKind::State,

            EngineError::DuplicatePatch { .. } | EngineError::DuplicatePatchInStage { .. } => {
                ErrorKind::Duplicate
            }

            EngineError::UnitOrder { .. }
            | EngineError::MissingUnit { .. }
            | EngineError::StepTable { .. }
            | EngineError::UnknownBootstrapFile { .. } => ErrorKind::Validation,

            EngineError::TrackingGap { .. } => ErrorKind::TrackingGap,

            EngineError::ScriptFailed { source, .. }
            | EngineError::MigrationFailed { source, .. } => match source.kind() {
                ErrorKind::TrackingGap => ErrorKind::TrackingGap,
                _ => ErrorKind::Execution,
            },

            EngineError::UnitFailed { .. }
            | EngineError::HookFailed { .. }
            | EngineError::Vcs { .. }
            | EngineError::Io { .. }
            | EngineError::Db(_) => ErrorKind::Execution,

            EngineError::Core(err) => core_kind(err),

            EngineError::Ledger(LedgerError::DuplicateRecord { .. }) => ErrorKind::Duplicate,
            EngineError::Ledger(LedgerError::Core(err)) => core_kind(err),
            EngineError::Ledger(_) => ErrorKind::Execution,
        }
    }
}

/// Serialize an error as its display message.
pub(crate) fn serialize_message<S: serde::Serializer>(
    err: &EngineError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(err)
}

fn core_kind(err: &CoreError) -> ErrorKind {
    match err {
        CoreError::InvalidPatchId { .. }
        | CoreError::InvalidVersion { .. }
        | CoreError::VersionOverflow { .. }
        | CoreError::InvalidBumpKind { .. }
        | CoreError::InvalidScriptName { .. }
        | CoreError::DuplicateSequence { .. }
        | CoreError::ConfigInvalid { .. }
        | CoreError::MalformedStageFile { .. }
        | CoreError::MalformedManifest { .. }
        | CoreError::YamlParse(_)
        | CoreError::Json(_) => ErrorKind::Validation,
        CoreError::ConfigNotFound { .. }
        | CoreError::InvalidTransition { .. }
        | CoreError::PatchNotFound { .. } => ErrorKind::State,
        CoreError::DuplicateStageEntry { .. } => ErrorKind::Duplicate,
        CoreError::Io(_) | CoreError::IoWithPath { .. } => ErrorKind::Execution,
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
