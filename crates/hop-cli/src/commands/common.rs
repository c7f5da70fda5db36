//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use hop_core::PatchId;
use hop_engine::{EngineError, ErrorKind, UnitFailure};
use std::fmt;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly. Commands
/// return it after they have already reported the failure themselves.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Empty: the failure was already printed by the command.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Exit status for a class of engine failure.
pub(crate) fn exit_code_for_kind(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Validation | ErrorKind::State | ErrorKind::Duplicate => 1,
        ErrorKind::TrackingGap => 3,
        ErrorKind::Execution => 4,
    }
}

/// Exit status for an error returned from a command.
///
/// An explicit [`ExitCode`] wins; otherwise the first [`EngineError`] in the
/// chain decides. Anything else is a plain failure.
pub(crate) fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(ExitCode(code)) = err.downcast_ref::<ExitCode>() {
        return *code;
    }
    err.chain()
        .find_map(|cause| cause.downcast_ref::<EngineError>())
        .map(|engine| exit_code_for_kind(engine.kind()))
        .unwrap_or(1)
}

/// Whether main should print `err` (an [`ExitCode`] was already reported).
pub(crate) fn should_report(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ExitCode>().is_none()
}

pub(crate) fn parse_patch_id(raw: &str) -> Result<PatchId> {
    PatchId::parse(raw)
        .map_err(EngineError::from)
        .with_context(|| format!("Invalid patch id '{raw}'"))
}

/// Print a unit failure and turn it into the matching exit code.
pub(crate) fn fail_with(failure: &UnitFailure) -> anyhow::Error {
    eprintln!("  Failed: {}", failure.unit);
    eprintln!("  {}", failure.error);
    ExitCode(exit_code_for_kind(failure.error.kind())).into()
}

/// Print a list of names under a heading, skipping empty lists.
pub(crate) fn print_section(heading: &str, names: &[String]) {
    if names.is_empty() {
        return;
    }
    println!("{heading}:");
    for name in names {
        println!("  {name}");
    }
}

/// Calculate column widths for a table given headers and row data.
///
/// For each column, returns the maximum width across the header and all
/// row values so that data aligns when printed with left-padding.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Print a formatted table to stdout.
///
/// Columns are left-aligned and separated by two spaces, with a dashed
/// separator under the header row.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  ").trim_end());

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  ").trim_end());
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
