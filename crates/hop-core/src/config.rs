//! Configuration types and parsing for `.hop/config.yml`
//!
//! [`HopConfig`] is an immutable value: it is loaded once, validated, and
//! passed by reference. The only "mutation" is [`HopConfig::with_tool_version`],
//! which returns a new value for the caller to save.

use crate::error::{CoreError, CoreResult};
use crate::fs_util::write_atomic;
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Repository configuration from `.hop/config.yml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HopConfig {
    /// Name of the package/schema this repository manages
    pub package_name: String,

    /// Tool version the repository structure has been upgraded to
    #[serde(default)]
    pub tool_version: Version,

    /// Branch that releases are prepared and promoted on
    #[serde(default = "default_production_branch")]
    pub production_branch: String,

    /// Target database connection
    #[serde(default, skip_serializing_if = "DatabaseConfig::is_unset")]
    pub database: DatabaseConfig,

    /// Interpreter used for procedural (`.py`) scripts
    #[serde(default = "default_interpreter")]
    pub procedural_interpreter: String,

    /// Command (argv) run after every applied script unit to regenerate code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codegen_command: Option<Vec<String>>,
}

/// Database connection configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database path (DuckDB file or `:memory:`); `<package_name>.duckdb`
    /// when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl DatabaseConfig {
    fn is_unset(&self) -> bool {
        self.path.is_none()
    }
}

const DEFAULT_DB_EXTENSION: &str = "duckdb";

fn default_production_branch() -> String {
    "ho-prod".to_string()
}

fn default_interpreter() -> String {
    "python3".to_string()
}

impl HopConfig {
    /// Fields shown by `hop status`, in display order.
    pub const DISPLAY_FIELDS: &'static [&'static str] = &[
        "package_name",
        "tool_version",
        "production_branch",
        "database.path",
        "procedural_interpreter",
        "codegen_command",
    ];

    /// Minimal configuration for a new repository.
    pub fn new(package_name: impl Into<String>, tool_version: Version) -> Self {
        Self {
            package_name: package_name.into(),
            tool_version,
            production_branch: default_production_branch(),
            database: DatabaseConfig::default(),
            procedural_interpreter: default_interpreter(),
            codegen_command: None,
        }
    }

    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        let config: HopConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as YAML, atomically.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        self.validate()?;
        let yaml = serde_yaml::to_string(self)?;
        write_atomic(path, yaml.as_bytes())
    }

    fn validate(&self) -> CoreResult<()> {
        if self.package_name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "package_name cannot be empty".to_string(),
            });
        }
        if self.production_branch.trim().is_empty() || self.production_branch.contains(' ') {
            return Err(CoreError::ConfigInvalid {
                message: format!("invalid production_branch '{}'", self.production_branch),
            });
        }
        if self.production_branch.starts_with(crate::patch_id::PATCH_BRANCH_PREFIX) {
            return Err(CoreError::ConfigInvalid {
                message: "production_branch must not be a patch branch".to_string(),
            });
        }
        if self.procedural_interpreter.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "procedural_interpreter cannot be empty".to_string(),
            });
        }
        if let Some(cmd) = &self.codegen_command {
            if cmd.is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: "codegen_command must name a program".to_string(),
                });
            }
        }
        Ok(())
    }

    /// A copy of this configuration declaring a different tool version.
    pub fn with_tool_version(&self, tool_version: Version) -> Self {
        Self {
            tool_version,
            ..self.clone()
        }
    }

    /// Configured database path, or a file named after the package.
    ///
    /// The bootstrap ledger lives in this database, so the default must
    /// persist between runs.
    pub fn database_path(&self) -> String {
        match &self.database.path {
            Some(path) => path.clone(),
            None => format!("{}.{DEFAULT_DB_EXTENSION}", self.package_name),
        }
    }

    /// Render [`Self::DISPLAY_FIELDS`] as `(name, value)` pairs.
    pub fn display_fields(&self) -> Vec<(&'static str, String)> {
        Self::DISPLAY_FIELDS
            .iter()
            .map(|&field| (field, self.display_value(field)))
            .collect()
    }

    fn display_value(&self, field: &str) -> String {
        match field {
            "package_name" => self.package_name.clone(),
            "tool_version" => self.tool_version.to_string(),
            "production_branch" => self.production_branch.clone(),
            "database.path" => self.database_path(),
            "procedural_interpreter" => self.procedural_interpreter.clone(),
            "codegen_command" => self
                .codegen_command
                .as_ref()
                .map(|cmd| cmd.join(" "))
                .unwrap_or_else(|| "-".to_string()),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
