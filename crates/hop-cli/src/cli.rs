//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use hop_core::BumpKind;
use std::path::PathBuf;

/// hop - patch and release orchestration for database schemas
#[derive(Parser, Debug)]
#[command(name = "hop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the repository root
    #[arg(short = 'p', long, global = true, default_value = ".", env = "HOP_PROJECT_DIR")]
    pub project_dir: PathBuf,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a hop repository in the current git work tree
    Init(InitArgs),

    /// Create a patch branch and directory
    CreatePatch(CreatePatchArgs),

    /// Apply the checked-out patch's scripts to the working database
    ApplyPatch(ApplyPatchArgs),

    /// Open the next release on the production branch
    PrepareRelease(PrepareReleaseArgs),

    /// Append an applied patch to the open release
    AddToRelease(AddToReleaseArgs),

    /// Merge the staged patches and archive the open release
    PromoteRelease(PromoteReleaseArgs),

    /// Run data-initialization files not yet recorded in the database
    Bootstrap(BootstrapArgs),

    /// Apply pending repository migration steps
    Upgrade,

    /// Record already-applied work the ledgers are missing
    Reconcile(ReconcileArgs),

    /// Show configuration, releases and patches
    Status(StatusArgs),
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Name of the package/schema the repository manages
    pub package_name: String,

    /// Branch releases are prepared on
    #[arg(long, default_value = "ho-prod")]
    pub production_branch: String,
}

/// Arguments for the create-patch command
#[derive(Args, Debug)]
pub struct CreatePatchArgs {
    /// Patch identifier (letters, digits, '-', '_', '.')
    pub patch_id: String,
}

/// Arguments for the apply-patch command
#[derive(Args, Debug)]
pub struct ApplyPatchArgs {
    /// Patch to apply (default: derived from the current branch)
    pub patch_id: Option<String>,

    /// Check ordering and presence of units without executing them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the prepare-release command
#[derive(Args, Debug)]
pub struct PrepareReleaseArgs {
    /// Version component to increment
    #[arg(value_enum)]
    pub level: BumpLevel,
}

/// Version component to increment
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpLevel {
    Major,
    Minor,
    Patch,
}

impl From<BumpLevel> for BumpKind {
    fn from(level: BumpLevel) -> Self {
        match level {
            BumpLevel::Major => BumpKind::Major,
            BumpLevel::Minor => BumpKind::Minor,
            BumpLevel::Patch => BumpKind::Patch,
        }
    }
}

/// Arguments for the add-to-release command
#[derive(Args, Debug)]
pub struct AddToReleaseArgs {
    /// Applied patch to stage
    pub patch_id: String,
}

/// Arguments for the promote-release command
#[derive(Args, Debug)]
pub struct PromoteReleaseArgs {
    /// Changelog message stored in the release manifest
    #[arg(short, long, default_value = "")]
    pub message: String,
}

/// Arguments for the bootstrap command
#[derive(Args, Debug)]
pub struct BootstrapArgs {
    /// Report what would run without executing or recording anything
    #[arg(long, conflicts_with = "force")]
    pub dry_run: bool,

    /// Re-run every file, including those already recorded
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the reconcile command
#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Bootstrap files to record as applied (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub bootstrap: Vec<String>,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show a single patch
    pub patch_id: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON document
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
