//! hop CLI - patch and release orchestration for database schemas

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod context;

use cli::Cli;
use commands::{
    add_to_release, apply_patch, bootstrap, common, create_patch, init, prepare_release,
    promote_release, reconcile, status, upgrade,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    if let Err(err) = run(&cli).await {
        if common::should_report(&err) {
            eprintln!("Error: {err:#}");
        }
        std::process::exit(common::exit_code(&err));
    }
}

async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        cli::Commands::Init(args) => init::execute(args, &cli.global).await,
        cli::Commands::CreatePatch(args) => create_patch::execute(args, &cli.global).await,
        cli::Commands::ApplyPatch(args) => apply_patch::execute(args, &cli.global).await,
        cli::Commands::PrepareRelease(args) => prepare_release::execute(args, &cli.global).await,
        cli::Commands::AddToRelease(args) => add_to_release::execute(args, &cli.global).await,
        cli::Commands::PromoteRelease(args) => promote_release::execute(args, &cli.global).await,
        cli::Commands::Bootstrap(args) => bootstrap::execute(args, &cli.global).await,
        cli::Commands::Upgrade => upgrade::execute(&cli.global).await,
        cli::Commands::Reconcile(args) => reconcile::execute(args, &cli.global).await,
        cli::Commands::Status(args) => status::execute(args, &cli.global).await,
    }
}

/// `warn` by default, `info` with `--verbose`; `RUST_LOG` overrides both.
///
/// The engine logs through the `log` facade; the subscriber picks those
/// records up through its log bridge.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}
