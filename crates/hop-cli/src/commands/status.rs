//! Status command implementation

use anyhow::{Context, Result};
use hop_core::{Patch, ReleaseManifest, Version};
use hop_engine::{PatchManager, Release, ReleaseStager, Vcs};
use serde::Serialize;

use crate::cli::{GlobalArgs, OutputFormat, StatusArgs};
use crate::commands::common::{parse_patch_id, print_table};
use crate::context::RuntimeContext;

/// Repository overview for JSON output
#[derive(Debug, Serialize)]
struct StatusOutput {
    package_name: String,
    tool_version: Version,
    branch: String,
    last_released: Version,
    last_release_manifest: Option<ReleaseManifest>,
    open_release: Option<Release>,
    patches: Vec<Patch>,
}

/// Execute the status command
pub(crate) async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let (ctx, _) = RuntimeContext::load_upgraded(global)?;
    let manager = PatchManager::new(&ctx.layout, &ctx.config, &ctx.vcs);

    if let Some(raw) = &args.patch_id {
        let id = parse_patch_id(raw)?;
        let patch = manager
            .status(&id)
            .with_context(|| format!("Failed to read patch '{id}'"))?;
        return match args.output {
            OutputFormat::Json => print_json(&patch),
            OutputFormat::Text => {
                print_patch_table(std::slice::from_ref(&patch));
                Ok(())
            }
        };
    }

    let stager = ReleaseStager::new(&ctx.layout, &ctx.config, &ctx.vcs);
    let output = StatusOutput {
        package_name: ctx.config.package_name.clone(),
        tool_version: ctx.config.tool_version,
        branch: ctx.vcs.current_branch()?,
        last_released: stager.last_released()?,
        last_release_manifest: stager.last_manifest()?,
        open_release: stager.current_release()?,
        patches: manager.list()?,
    };

    match args.output {
        OutputFormat::Json => print_json(&output),
        OutputFormat::Text => {
            print_text(&ctx, &output);
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize status")?;
    println!("{json}");
    Ok(())
}

fn print_text(ctx: &RuntimeContext, output: &StatusOutput) {
    for (field, value) in ctx.config.display_fields() {
        println!("{field:<24}{value}");
    }
    println!("{:<24}{}", "branch", output.branch);
    println!("{:<24}{}", "last release", output.last_released);
    if let Some(manifest) = &output.last_release_manifest {
        if !manifest.changelog_message.is_empty() {
            println!("{:<24}{}", "changelog", manifest.changelog_message);
        }
    }
    match &output.open_release {
        Some(release) => println!(
            "{:<24}{} ({} patch(es))",
            "open release",
            release.version,
            release.stage_entries.len()
        ),
        None => println!("{:<24}-", "open release"),
    }

    println!();
    if output.patches.is_empty() {
        println!("No patches");
    } else {
        print_patch_table(&output.patches);
    }
}

fn print_patch_table(patches: &[Patch]) {
    let rows: Vec<Vec<String>> = patches
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.status.to_string(),
                p.release.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()),
                p.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    print_table(&["PATCH", "STATUS", "RELEASE", "UPDATED"], &rows);
}
