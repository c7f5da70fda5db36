//! Runtime context for CLI commands

use anyhow::{Context, Result};
use hop_core::{HopConfig, RepoLayout};
use hop_db::DuckDbBackend;
use hop_engine::vcs::is_git_repository;
use hop_engine::{
    CodegenHook, CommandHook, DbScriptExecutor, EngineError, GitCli, MigrationSequencer, NoopHook,
    UpgradeReport,
};
use hop_ledger::{DuckDbLedger, FileLedger};
use std::path::Path;
use std::sync::Arc;

use crate::cli::GlobalArgs;

const MEMORY_PATH: &str = ":memory:";

/// Runtime context containing the repository layout, its configuration and
/// the git handle every command works through
pub(crate) struct RuntimeContext {
    pub layout: RepoLayout,

    pub config: HopConfig,

    pub vcs: GitCli,
}

impl RuntimeContext {
    /// Load the repository without touching its structure.
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let root = global.project_dir.as_path();
        ensure_git_repository(root)?;

        let layout = RepoLayout::new(root);
        let config = HopConfig::load(&layout.config_path())
            .map_err(EngineError::from)
            .context("Failed to load repository configuration")?;
        log::debug!(
            "Loaded {} (tool version {}) from {}",
            config.package_name,
            config.tool_version,
            root.display()
        );
        let vcs = GitCli::new(root);
        Ok(Self {
            layout,
            config,
            vcs,
        })
    }

    /// Load the repository and bring its structure up to date first.
    ///
    /// Every command except `init` and `reconcile` goes through here, so the
    /// sequencer runs once per invocation before anything else.
    pub fn load_upgraded(global: &GlobalArgs) -> Result<(Self, UpgradeReport)> {
        let mut ctx = Self::load(global)?;
        let report = ctx.upgrade()?;
        Ok((ctx, report))
    }

    /// Run pending migration steps and reload the configuration they raised.
    fn upgrade(&mut self) -> Result<UpgradeReport> {
        let mut ledger = FileLedger::open(&self.layout.migration_ledger_path())
            .map_err(EngineError::from)
            .context("Failed to open migration ledger")?;
        let sequencer = MigrationSequencer::new(&self.layout, &self.vcs)?;
        let report = sequencer.run(&mut ledger, &self.config)?;

        if report.to != self.config.tool_version {
            self.config = HopConfig::load(&self.layout.config_path()).map_err(EngineError::from)?;
        }
        Ok(report)
    }

    /// Database path with relative file paths resolved against the
    /// repository root.
    pub fn database_path(&self) -> String {
        let path = self.config.database_path();
        if path == MEMORY_PATH || Path::new(&path).is_absolute() {
            return path;
        }
        self.layout.root().join(path).display().to_string()
    }

    /// Open the configured database.
    pub fn open_database(&self) -> Result<Arc<DuckDbBackend>> {
        let path = self.database_path();
        let backend = DuckDbBackend::new(&path)
            .map_err(EngineError::from)
            .with_context(|| format!("Failed to connect to database: {path}"))?;
        Ok(Arc::new(backend))
    }

    /// Bootstrap ledger stored in the same database instance as `backend`.
    pub fn open_ledger(&self, backend: &DuckDbBackend) -> Result<DuckDbLedger> {
        let conn = backend.try_clone_connection().map_err(EngineError::from)?;
        let ledger = DuckDbLedger::from_connection(conn)
            .map_err(EngineError::from)
            .context("Failed to open bootstrap ledger")?;
        Ok(ledger)
    }

    pub fn executor(&self, backend: Arc<DuckDbBackend>) -> DbScriptExecutor {
        DbScriptExecutor::new(
            backend,
            self.database_path(),
            self.config.procedural_interpreter.clone(),
        )
    }

    /// Configured code generation hook, or a no-op.
    pub fn hook(&self) -> Box<dyn CodegenHook> {
        match CommandHook::from_config(&self.config, self.layout.root()) {
            Some(hook) => Box::new(hook),
            None => Box::new(NoopHook),
        }
    }
}

/// Fail early when `root` is not inside a git work tree.
pub(crate) fn ensure_git_repository(root: &Path) -> Result<()> {
    if !is_git_repository(root) {
        anyhow::bail!("'{}' is not inside a git repository", root.display());
    }
    Ok(())
}
