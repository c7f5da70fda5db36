//! Error types for hop-core

use thiserror::Error;

/// Core error type for hop
#[derive(Error, Debug)]
pub enum CoreError {
    /// H001: Configuration file not found
    #[error("[H001] Config file not found: {path}. Run `hop init` first")]
    ConfigNotFound { path: String },

    /// H002: Invalid configuration value
    #[error("[H002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// H003: Malformed patch identifier
    #[error("[H003] Invalid patch id '{id}': {reason}")]
    InvalidPatchId { id: String, reason: String },

    /// H004: Malformed version string
    #[error("[H004] Invalid version '{input}': expected MAJOR.MINOR.PATCH")]
    InvalidVersion { input: String },

    /// H016: Bumping would overflow a version component
    #[error("[H016] Cannot apply a {kind} bump to {version}: component out of range")]
    VersionOverflow { version: String, kind: String },

    /// H005: Unknown bump kind
    #[error("[H005] Invalid bump kind '{input}': expected major, minor or patch")]
    InvalidBumpKind { input: String },

    /// H006: Script file name does not follow the naming convention
    #[error("[H006] Invalid script name '{name}': expected {expected}")]
    InvalidScriptName { name: String, expected: &'static str },

    /// H007: Two scripts share a sequence number
    #[error("[H007] Duplicate sequence number {sequence} in {dir}: '{first}' and '{second}'")]
    DuplicateSequence {
        dir: String,
        sequence: u64,
        first: String,
        second: String,
    },

    /// H008: Stage file content violates the line format
    #[error("[H008] Malformed stage file {path}: {reason}")]
    MalformedStageFile { path: String, reason: String },

    /// H015: Patch already listed in a stage file
    #[error("[H015] Patch '{id}' is already listed in {path}")]
    DuplicateStageEntry { id: String, path: String },

    /// H009: Release manifest could not be parsed
    #[error("[H009] Malformed release manifest {path}: {source}")]
    MalformedManifest {
        path: String,
        source: serde_json::Error,
    },

    /// H010: Patch lifecycle transition not permitted
    #[error("[H010] Patch '{id}' cannot move from {from} to {to}")]
    InvalidTransition { id: String, from: String, to: String },

    /// H011: Patch registry lookup failed
    #[error("[H011] Patch not found: {id}")]
    PatchNotFound { id: String },

    /// H012: IO error
    #[error("[H012] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// H013: IO error with file path context
    #[error("[H013] Failed to access '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// H014: YAML parse error
    #[error("[H014] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Attach a path to an IO error.
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        CoreError::IoWithPath {
            path: path.display().to_string(),
            source,
        }
    }
}
