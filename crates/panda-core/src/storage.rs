//! Writing finished archives and state files to disk.
//!
//! Bytes go to a `.part` sibling first, are synced, then renamed over the
//! final path, so an interrupted run never leaves a truncated archive under
//! the real name.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.zip` → `a.zip.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Writes `bytes` to `final_path` via a synced temp file and a rename.
/// Creates the parent directory if needed. An existing file is replaced.
pub fn write_atomic(final_path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = final_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir: {}", parent.display()))?;
    }
    let tp = temp_path(final_path);
    let mut file = File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tp)
        .with_context(|| format!("failed to create temp file: {}", tp.display()))?;
    file.write_all(bytes)
        .with_context(|| format!("write {}", tp.display()))?;
    file.sync_all().context("storage sync failed")?;
    drop(file);

    std::fs::rename(&tp, final_path).with_context(|| {
        format!("failed to rename {} to {}", tp.display(), final_path.display())
    })?;
    Ok(())
}

/// Picks `dir/file_name`, or `dir/file_name (n).ext` if that already exists on disk.
pub fn unused_path(dir: &Path, file_name: &str) -> PathBuf {
    let first = dir.join(file_name);
    if !first.exists() {
        return first;
    }
    (1..)
        .map(|n| dir.join(crate::naming::disambiguate(file_name, n)))
        .find(|p| !p.exists())
        .unwrap_or(first)
}
