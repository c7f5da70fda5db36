//! Filesystem helpers shared by the persisted state files.

use crate::error::{CoreError, CoreResult};
use std::fs;
use std::path::Path;

/// Write `contents` to `path` atomically.
///
/// Uses write-to-temp-then-rename so a crash never leaves a torn file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, contents).map_err(|e| CoreError::io(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| CoreError::io(path, e))?;
    Ok(())
}
