//! First-line marker directives.
//!
//! A script is flagged as a bootstrap unit when its first line is a comment
//! whose body is exactly [`BOOTSTRAP_DIRECTIVE`]:
//!
//! ```text
//! -- @HOP:bootstrap
//! INSERT INTO app.roles VALUES ('admin');
//! ```
//!
//! Both SQL (`--`) and procedural (`#`) comment leaders are recognized. Every
//! caller goes through [`classify_line`] / [`classify_file`]; nothing else
//! should match on the directive text.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Directive that marks a file as a bootstrap unit.
pub const BOOTSTRAP_DIRECTIVE: &str = "@HOP:bootstrap";

const COMMENT_LEADERS: &[&str] = &["--", "#"];

/// Classification of a script based on its first line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitTag {
    /// Ordinary script
    #[default]
    Plain,
    /// Data-initialization script run once after schema changes
    Bootstrap,
}

impl UnitTag {
    pub fn is_bootstrap(self) -> bool {
        self == UnitTag::Bootstrap
    }
}

/// Classify a single line of text.
pub fn classify_line(line: &str) -> UnitTag {
    let line = line.trim();
    let body = COMMENT_LEADERS
        .iter()
        .find_map(|leader| line.strip_prefix(leader));

    match body {
        Some(body) if body.trim() == BOOTSTRAP_DIRECTIVE => UnitTag::Bootstrap,
        _ => UnitTag::Plain,
    }
}

/// Classify a file by reading only its first line.
///
/// Empty files are `Plain`.
pub fn classify_file(path: &Path) -> CoreResult<UnitTag> {
    let file = File::open(path).map_err(|e| CoreError::io(path, e))?;
    let mut first = String::new();
    BufReader::new(file)
        .read_line(&mut first)
        .map_err(|e| CoreError::io(path, e))?;
    Ok(classify_line(first.trim_start_matches('\u{feff}')))
}

#[cfg(test)]
#[path = "marker_test.rs"]
mod tests;
